//! Typed quote errors
//!
//! Every caller-visible failure of the quote pipeline is a `SwapError` carried
//! in a `Result`. Failures of individual pools never reach this type; they are
//! dropped from the fan-out results instead.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeQuoteError {
    /// Sell asset lives on a chain without longtail support
    UnsupportedChain,
    /// No pool or aggregator can carry the trade
    UnsupportedTradePair,
    /// Sell amount does not cover minimums/outbound fees
    SellAmountBelowMinimum,
    /// Upstream quote service failed or returned garbage
    QueryFailed,
    InternalError,
}

impl fmt::Display for TradeQuoteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeQuoteError::UnsupportedChain => write!(f, "UnsupportedChain"),
            TradeQuoteError::UnsupportedTradePair => write!(f, "UnsupportedTradePair"),
            TradeQuoteError::SellAmountBelowMinimum => write!(f, "SellAmountBelowMinimum"),
            TradeQuoteError::QueryFailed => write!(f, "QueryFailed"),
            TradeQuoteError::InternalError => write!(f, "InternalError"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, Serialize)]
#[error("{code}: {message}")]
pub struct SwapError {
    pub message: String,
    pub code: TradeQuoteError,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl SwapError {
    pub fn new<T: Into<String>>(code: TradeQuoteError, message: T) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn unsupported_chain<T: Into<String>>(message: T) -> Self {
        Self::new(TradeQuoteError::UnsupportedChain, message)
    }

    pub fn unsupported_trade_pair<T: Into<String>>(message: T) -> Self {
        Self::new(TradeQuoteError::UnsupportedTradePair, message)
    }

    pub fn query_failed<T: Into<String>>(message: T) -> Self {
        Self::new(TradeQuoteError::QueryFailed, message)
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::new(TradeQuoteError::InternalError, message)
    }
}
