//! Core data structures for longtail quoting
//!
//! Everything here is request-scoped: built fresh for each quote call and
//! dropped once the response is returned.

use crate::assets::{Asset, AssetId};
use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Uniswap V3 fee tiers, in hundredths of a bip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FeeAmount {
    Lowest, // 0.01% - stablecoin pairs
    Low,    // 0.05% - stable/correlated pairs
    Medium, // 0.30% - standard tier
    High,   // 1.00% - exotic pairs
}

impl FeeAmount {
    /// Every tier a pool can be deployed at, ascending
    pub const ALL: [FeeAmount; 4] = [
        FeeAmount::Lowest,
        FeeAmount::Low,
        FeeAmount::Medium,
        FeeAmount::High,
    ];

    /// Fee as the factory/quoter `uint24` value (500 = 0.05%)
    pub fn as_u32(&self) -> u32 {
        match self {
            FeeAmount::Lowest => 100,
            FeeAmount::Low => 500,
            FeeAmount::Medium => 3000,
            FeeAmount::High => 10000,
        }
    }

    pub fn from_u32(fee: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_u32() == fee)
    }

    /// Get the fee as a percentage
    pub fn fee_percent(&self) -> f64 {
        self.as_u32() as f64 / 10000.0
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}%", self.fee_percent())
    }
}

/// A pool that would exist at a derived address. Not verified on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCandidate {
    /// Lower of the two token addresses
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeAmount,
}

/// A pool confirmed to exist on-chain, with the tokens it reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolContractData {
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeAmount,
}

/// Direction of a trade relative to THORChain pool assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeType {
    LongTailToL1,
    L1ToLongTail,
    L1ToL1,
    LongTailToLongTail,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeType::LongTailToL1 => write!(f, "LongTailToL1"),
            TradeType::L1ToLongTail => write!(f, "L1ToLongTail"),
            TradeType::L1ToL1 => write!(f, "L1ToL1"),
            TradeType::LongTailToLongTail => write!(f, "LongTailToLongTail"),
        }
    }
}

/// A quote request
#[derive(Debug, Clone)]
pub struct TradeQuoteInput {
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    /// Sell amount in the sell asset's base units
    pub sell_amount_including_protocol_fees_crypto_base_unit: U256,
    /// Destination on the buy asset's chain
    pub receive_address: String,
    pub affiliate_bps: u16,
    pub slippage_tolerance_bps: Option<u16>,
}

/// A fee charged by the protocol, denominated in `asset_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolFee {
    pub asset_id: AssetId,
    #[serde(serialize_with = "serialize_u256")]
    pub amount_crypto_base_unit: U256,
    pub requires_balance: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    #[serde(serialize_with = "serialize_opt_u256")]
    pub network_fee_crypto_base_unit: Option<U256>,
    pub protocol_fees: Vec<ProtocolFee>,
}

/// One leg of a trade
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeQuoteStep {
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    #[serde(serialize_with = "serialize_u256")]
    pub sell_amount_including_protocol_fees_crypto_base_unit: U256,
    #[serde(serialize_with = "serialize_u256")]
    pub buy_amount_before_fees_crypto_base_unit: U256,
    #[serde(serialize_with = "serialize_u256")]
    pub buy_amount_after_fees_crypto_base_unit: U256,
    /// Contract the sell token must be approved to
    pub allowance_contract: Address,
    pub rate: Decimal,
    pub source: String,
    pub fee_data: FeeData,
    pub estimated_execution_time_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongtailData {
    /// Wrapped-native amount the Uniswap V3 leg is expected to produce
    #[serde(serialize_with = "serialize_u256")]
    pub longtail_to_l1_expected_amount_out: U256,
}

/// A full (possibly multi-leg) trade quote
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeQuote {
    pub id: String,
    pub rate: Decimal,
    pub steps: Vec<TradeQuoteStep>,
    pub receive_address: String,
    pub affiliate_bps: u16,
    pub memo: Option<String>,
    /// Router the longtail leg is executed through
    pub aggregator: Option<Address>,
    pub is_streaming: bool,
    pub trade_type: TradeType,
    pub is_longtail: bool,
    pub longtail_data: Option<LongtailData>,
}

/// Fractional digits a rate is computed with (Decimal's maximum scale)
const RATE_SCALE: u32 = 28;

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exp))
}

/// Human-unit rate (buy per one sell).
///
/// The ratio is taken in U256 fixed point, so base-unit amounts far beyond
/// Decimal's 96-bit mantissa still price correctly. Zero when the sell side is
/// zero or the rate itself can't be represented.
pub fn compute_rate(sell_amount: U256, sell_precision: u8, buy_amount: U256, buy_precision: u8) -> Decimal {
    // rate = (buy / 10^buy_precision) / (sell / 10^sell_precision)
    let numerator = pow10(sell_precision as u32).and_then(|p| buy_amount.checked_mul(p));
    let denominator = pow10(buy_precision as u32).and_then(|p| sell_amount.checked_mul(p));
    let (Some(numerator), Some(denominator)) = (numerator, denominator) else {
        return Decimal::ZERO;
    };
    if denominator.is_zero() {
        return Decimal::ZERO;
    }

    let max_mantissa = U256::from(u128::MAX >> 32);
    let ten = U256::from(10u64);

    // Widest scale whose scaled numerator still fits in U256
    let mut scale = RATE_SCALE;
    let scaled = loop {
        if let Some(scaled) = pow10(scale).and_then(|p| numerator.checked_mul(p)) {
            break scaled;
        }
        if scale == 0 {
            return Decimal::ZERO;
        }
        scale -= 1;
    };

    let mut mantissa = scaled / denominator;
    while mantissa > max_mantissa && scale > 0 {
        mantissa /= ten;
        scale -= 1;
    }

    u128::try_from(mantissa)
        .ok()
        .filter(|_| mantissa <= max_mantissa)
        .and_then(|m| Decimal::try_from_i128_with_scale(m as i128, scale).ok())
        .map(|rate| rate.normalize())
        .unwrap_or_default()
}

/// Base-unit amounts are emitted as decimal strings, never as floats or hex.
pub fn serialize_u256<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn serialize_opt_u256<S: Serializer>(
    value: &Option<U256>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_tiers() {
        let fees: Vec<u32> = FeeAmount::ALL.iter().map(|f| f.as_u32()).collect();
        assert_eq!(fees, vec![100, 500, 3000, 10000]);
        assert_eq!(FeeAmount::from_u32(3000), Some(FeeAmount::Medium));
        assert_eq!(FeeAmount::from_u32(2500), None);
        assert_eq!(FeeAmount::Low.to_string(), "0.05%");
    }

    #[test]
    fn test_compute_rate() {
        // 2 FOX (18 decimals) -> 0.5 ETH (18 decimals)
        let rate = compute_rate(
            U256::from(2_000_000_000_000_000_000u128),
            18,
            U256::from(500_000_000_000_000_000u128),
            18,
        );
        assert_eq!(rate, dec!(0.25));

        // 1 ETH -> 0.05 BTC (8 decimals)
        let rate = compute_rate(
            U256::from(1_000_000_000_000_000_000u128),
            18,
            U256::from(5_000_000u64),
            8,
        );
        assert_eq!(rate, dec!(0.05));

        // 1e29 base units (1e11 tokens at 18 decimals) -> 0.1 BTC
        let rate = compute_rate(
            U256::from(10u64).pow(U256::from(29u64)),
            18,
            U256::from(10_000_000u64),
            8,
        );
        assert_eq!(rate, dec!(0.000000000001));

        // buy side past Decimal's mantissa too: 1e30 per 1 -> 1e12
        let rate = compute_rate(
            U256::from(1_000_000_000_000_000_000u128),
            18,
            U256::from(10u64).pow(U256::from(30u64)),
            18,
        );
        assert_eq!(rate, dec!(1000000000000));

        assert_eq!(compute_rate(U256::ZERO, 18, U256::from(1u64), 8), Decimal::ZERO);
        assert_eq!(compute_rate(U256::from(1u64), 18, U256::MAX, 8), Decimal::ZERO);
    }

    #[test]
    fn test_longtail_data_serializes_decimal_string() {
        let data = LongtailData {
            longtail_to_l1_expected_amount_out: U256::from(1_000_000_000_000_000_000u128),
        };
        let json = serde_json::to_value(data).unwrap();
        assert_eq!(
            json["longtailToL1ExpectedAmountOut"],
            serde_json::json!("1000000000000000000")
        );
    }
}
