//! THORChain asset notation and amount precision
//!
//! THORChain names assets `CHAIN.SYMBOL` (native) or `CHAIN.SYMBOL-CONTRACT`
//! (tokens) and denominates every amount with 8 decimals, whatever the
//! asset's own precision.

use crate::assets::{
    token_from_asset, Asset, ChainId, AVALANCHE_CHAIN_ID, BCH_CHAIN_ID, BSC_CHAIN_ID,
    BTC_CHAIN_ID, COSMOS_CHAIN_ID, DOGE_CHAIN_ID, ETH_CHAIN_ID, LTC_CHAIN_ID, THORCHAIN_CHAIN_ID,
};
use alloy::primitives::U256;

pub const THOR_PRECISION: u8 = 8;

/// THORChain chain symbol for a CAIP-2 chain id
pub fn thor_chain(chain_id: &ChainId) -> Option<&'static str> {
    match chain_id.as_str() {
        ETH_CHAIN_ID => Some("ETH"),
        AVALANCHE_CHAIN_ID => Some("AVAX"),
        BSC_CHAIN_ID => Some("BSC"),
        BTC_CHAIN_ID => Some("BTC"),
        BCH_CHAIN_ID => Some("BCH"),
        DOGE_CHAIN_ID => Some("DOGE"),
        LTC_CHAIN_ID => Some("LTC"),
        COSMOS_CHAIN_ID => Some("GAIA"),
        THORCHAIN_CHAIN_ID => Some("THOR"),
        _ => None,
    }
}

/// Pool notation of an asset, e.g. `BTC.BTC` or `ETH.USDC-0XA0B8...`
pub fn thor_asset_notation(asset: &Asset) -> Option<String> {
    let chain = thor_chain(&asset.chain_id)?;
    let symbol = asset.symbol.to_uppercase();

    if asset.asset_id.is_native() {
        return Some(format!("{}.{}", chain, symbol));
    }

    let token = token_from_asset(asset)?;
    Some(format!("{}.{}-{}", chain, symbol, token.to_string().to_uppercase()))
}

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// Rescale an amount between precisions, truncating when precision drops
fn rescale(amount: U256, from: u8, to: u8) -> U256 {
    if from > to {
        amount / pow10(from - to)
    } else {
        amount.saturating_mul(pow10(to - from))
    }
}

/// Asset base units -> THORChain 1e8 units
pub fn to_thor_base_unit(amount: U256, precision: u8) -> U256 {
    rescale(amount, precision, THOR_PRECISION)
}

/// THORChain 1e8 units -> asset base units
pub fn from_thor_base_unit(amount: U256, precision: u8) -> U256 {
    rescale(amount, THOR_PRECISION, precision)
}
