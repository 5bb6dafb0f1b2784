//! THORNode swap quotes
//!
//! L1QuoteSource over THORNode's `/thorchain/quote/swap` endpoint. With a
//! streaming interval, a rapid and a streaming quote are requested side by
//! side and whichever succeed are returned.
//!
//! Created: 2026-10-16

use super::notation::{from_thor_base_unit, thor_asset_notation, to_thor_base_unit};
use crate::assets::Asset;
use crate::error::{SwapError, TradeQuoteError};
use crate::quote::L1QuoteSource;
use crate::types::{
    compute_rate, FeeData, ProtocolFee, TradeQuote, TradeQuoteInput, TradeQuoteStep, TradeType,
};
use alloy::primitives::{hex, keccak256, Address, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const QUOTE_SWAP_PATH: &str = "/thorchain/quote/swap";

/// Error fragments THORNode uses when the input can't cover fees/dust limits
const BELOW_MINIMUM_MARKERS: [&str; 3] = [
    "not enough asset to pay for fees",
    "less than dust threshold",
    "amount less than min",
];

#[derive(Debug, Clone, Deserialize)]
pub struct ThornodeQuoteFees {
    pub asset: String,
    #[serde(default)]
    pub affiliate: Option<String>,
    #[serde(default)]
    pub outbound: Option<String>,
    #[serde(default)]
    pub liquidity: Option<String>,
    pub total: String,
    #[serde(default)]
    pub slippage_bps: Option<u32>,
    #[serde(default)]
    pub total_bps: Option<u32>,
}

/// Subset of the THORNode quote response this crate uses
#[derive(Debug, Clone, Deserialize)]
pub struct ThornodeQuoteResponse {
    #[serde(default)]
    pub inbound_address: Option<String>,
    #[serde(default)]
    pub router: Option<String>,
    #[serde(default)]
    pub expiry: Option<u64>,
    #[serde(default)]
    pub memo: Option<String>,
    pub expected_amount_out: String,
    #[serde(default)]
    pub recommended_min_amount_in: Option<String>,
    pub fees: ThornodeQuoteFees,
    #[serde(default)]
    pub total_swap_seconds: Option<u64>,
    #[serde(default)]
    pub streaming_swap_blocks: Option<u64>,
    #[serde(default)]
    pub max_streaming_quantity: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ThornodeErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Map a THORNode error body to a typed error
fn classify_error(body: &str) -> SwapError {
    let message = serde_json::from_str::<ThornodeErrorResponse>(body)
        .ok()
        .and_then(|e| e.message.or(e.error))
        .unwrap_or_else(|| body.trim().to_string());

    let lower = message.to_lowercase();
    let code = if BELOW_MINIMUM_MARKERS.iter().any(|m| lower.contains(m)) {
        TradeQuoteError::SellAmountBelowMinimum
    } else {
        TradeQuoteError::QueryFailed
    };

    SwapError::new(code, format!("THORNode quote failed: {}", message))
        .with_details(json!({ "thornodeMessage": message }))
}

fn parse_amount(value: &str, field: &str) -> Result<U256, SwapError> {
    U256::from_str_radix(value, 10).map_err(|e| {
        SwapError::query_failed(format!("Invalid {} in THORNode response: {} ({})", field, value, e))
    })
}

/// Build a single-step trade quote from a THORNode response
pub fn quote_from_response(
    response: &ThornodeQuoteResponse,
    input: &TradeQuoteInput,
    is_streaming: bool,
    trade_type: TradeType,
) -> Result<TradeQuote, SwapError> {
    let sell_asset = &input.sell_asset;
    let buy_asset = &input.buy_asset;
    let sell_amount = input.sell_amount_including_protocol_fees_crypto_base_unit;

    let expected_out = parse_amount(&response.expected_amount_out, "expected_amount_out")?;
    let total_fees = parse_amount(&response.fees.total, "fees.total")?;

    let buy_amount_after_fees = from_thor_base_unit(expected_out, buy_asset.precision);
    let buy_amount_before_fees =
        from_thor_base_unit(expected_out.saturating_add(total_fees), buy_asset.precision);

    // Tokens are approved to the router; native sells need no allowance
    let allowance_contract = match (&response.router, sell_asset.asset_id.is_native()) {
        (Some(router), false) => router.parse::<Address>().map_err(|e| {
            SwapError::query_failed(format!("Invalid router in THORNode response: {} ({})", router, e))
        })?,
        _ => Address::ZERO,
    };

    let rate = compute_rate(
        sell_amount,
        sell_asset.precision,
        buy_amount_after_fees,
        buy_asset.precision,
    );

    let protocol_fees = vec![ProtocolFee {
        asset_id: buy_asset.asset_id.clone(),
        amount_crypto_base_unit: from_thor_base_unit(total_fees, buy_asset.precision),
        requires_balance: false,
    }];

    let memo = response.memo.clone();
    let id_seed = format!(
        "{}:{}:{}:{}",
        memo.as_deref().unwrap_or_default(),
        response.expiry.unwrap_or_default(),
        response.expected_amount_out,
        is_streaming
    );
    let id = hex::encode(&keccak256(id_seed.as_bytes())[..8]);

    let source = if is_streaming {
        "THORChain • Streaming"
    } else {
        "THORChain"
    };

    Ok(TradeQuote {
        id,
        rate,
        steps: vec![TradeQuoteStep {
            sell_asset: sell_asset.clone(),
            buy_asset: buy_asset.clone(),
            sell_amount_including_protocol_fees_crypto_base_unit: sell_amount,
            buy_amount_before_fees_crypto_base_unit: buy_amount_before_fees,
            buy_amount_after_fees_crypto_base_unit: buy_amount_after_fees,
            allowance_contract,
            rate,
            source: source.to_string(),
            fee_data: FeeData {
                network_fee_crypto_base_unit: None,
                protocol_fees,
            },
            estimated_execution_time_ms: response.total_swap_seconds.map(|s| s * 1000),
        }],
        receive_address: input.receive_address.clone(),
        affiliate_bps: input.affiliate_bps,
        memo,
        aggregator: None,
        is_streaming,
        trade_type,
        is_longtail: false,
        longtail_data: None,
    })
}

/// Combine the rapid and streaming attempts: every success is returned, the
/// rapid failure is reported only when neither produced a quote.
fn merge_quote_results(
    rapid: Result<ThornodeQuoteResponse, SwapError>,
    streaming: Result<ThornodeQuoteResponse, SwapError>,
    input: &TradeQuoteInput,
    trade_type: TradeType,
) -> Result<Vec<TradeQuote>, SwapError> {
    let mut quotes = Vec::with_capacity(2);
    let mut first_error = None;

    for (result, is_streaming) in [(rapid, false), (streaming, true)] {
        match result.and_then(|r| quote_from_response(&r, input, is_streaming, trade_type)) {
            Ok(quote) => quotes.push(quote),
            Err(e) => {
                let kind = if is_streaming { "streaming" } else { "rapid" };
                warn!("THORNode {} quote failed: {}", kind, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if quotes.is_empty() => Err(e),
        _ => Ok(quotes),
    }
}

/// THORNode-backed L1 quote source
pub struct ThornodeQuoteSource {
    client: reqwest::Client,
    base_url: String,
    affiliate: Option<String>,
}

impl ThornodeQuoteSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build THORNode HTTP client")?;

        info!("ThornodeQuoteSource initialized: {}", base_url);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            affiliate: None,
        })
    }

    /// THORName credited with `affiliate_bps`; without one no affiliate fee is requested
    pub fn with_affiliate(mut self, affiliate: impl Into<String>) -> Self {
        self.affiliate = Some(affiliate.into());
        self
    }

    fn notation(asset: &Asset) -> Result<String, SwapError> {
        thor_asset_notation(asset).ok_or_else(|| {
            SwapError::unsupported_trade_pair(format!(
                "Asset {} is not supported by THORChain.",
                asset.asset_id
            ))
        })
    }

    async fn fetch_quote(
        &self,
        params: &[(&str, String)],
    ) -> Result<ThornodeQuoteResponse, SwapError> {
        let url = format!("{}{}", self.base_url, QUOTE_SWAP_PATH);
        debug!("THORNode quote request: {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| SwapError::query_failed(format!("THORNode request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SwapError::query_failed(format!("THORNode response unreadable: {}", e)))?;

        if !status.is_success() {
            return Err(classify_error(&body));
        }

        // Older THORNode versions answer 200 with an `error` field
        if let Ok(ThornodeErrorResponse { error: Some(_), .. }) =
            serde_json::from_str::<ThornodeErrorResponse>(&body)
        {
            return Err(classify_error(&body));
        }

        serde_json::from_str(&body).map_err(|e| {
            SwapError::query_failed(format!("Invalid THORNode quote response: {}", e))
        })
    }
}

#[async_trait]
impl L1QuoteSource for ThornodeQuoteSource {
    async fn get_l1_quote(
        &self,
        input: &TradeQuoteInput,
        streaming_interval: u32,
        trade_type: TradeType,
    ) -> Result<Vec<TradeQuote>, SwapError> {
        let from_asset = Self::notation(&input.sell_asset)?;
        let to_asset = Self::notation(&input.buy_asset)?;

        let amount = to_thor_base_unit(
            input.sell_amount_including_protocol_fees_crypto_base_unit,
            input.sell_asset.precision,
        );
        if amount.is_zero() {
            return Err(SwapError::new(
                TradeQuoteError::SellAmountBelowMinimum,
                "Sell amount rounds to zero in THORChain units.",
            ));
        }

        let mut params = vec![
            ("from_asset", from_asset),
            ("to_asset", to_asset),
            ("amount", amount.to_string()),
            ("destination", input.receive_address.clone()),
        ];
        let affiliate_bps = match &self.affiliate {
            Some(affiliate) if input.affiliate_bps > 0 => {
                params.push(("affiliate", affiliate.clone()));
                params.push(("affiliate_bps", input.affiliate_bps.to_string()));
                input.affiliate_bps
            }
            _ => 0,
        };
        if let Some(tolerance) = input.slippage_tolerance_bps {
            params.push(("tolerance_bps", tolerance.to_string()));
        }

        // Quotes report the affiliate fee actually requested
        let input = TradeQuoteInput {
            affiliate_bps,
            ..input.clone()
        };

        if streaming_interval == 0 {
            let response = self.fetch_quote(&params).await?;
            return Ok(vec![quote_from_response(&response, &input, false, trade_type)?]);
        }

        let mut streaming_params = params.clone();
        streaming_params.push(("streaming_interval", streaming_interval.to_string()));
        // 0 lets THORNode pick the sub-swap count
        streaming_params.push(("streaming_quantity", "0".to_string()));

        let (rapid, streaming) =
            tokio::join!(self.fetch_quote(&params), self.fetch_quote(&streaming_params));

        merge_quote_results(rapid, streaming, &input, trade_type)
    }
}
