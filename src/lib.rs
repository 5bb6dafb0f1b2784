//! Longtail Quoter Library
//!
//! Quotes swaps of long-tail ERC-20 tokens into L1 assets: the token is sold
//! into the chain's wrapped native token through the best Uniswap V3 pool,
//! and the proceeds are quoted across chains on THORChain.
//!
//! Created: 2026-10-16

pub mod assets;
pub mod config;
pub mod contracts;
pub mod error;
pub mod pool;
pub mod quote;
pub mod thorchain;
pub mod types;

// Re-export commonly used types
pub use assets::{load_assets, Asset, AssetId, AssetsById, ChainId, KnownFeeAssets};
pub use config::{load_config, LongtailConfig};
pub use error::{SwapError, TradeQuoteError};
pub use quote::{L1QuoteSource, LongtailQuoter};
pub use thorchain::ThornodeQuoteSource;
pub use types::{FeeAmount, TradeQuote, TradeQuoteInput, TradeQuoteStep, TradeType};
