//! Longtail quote composition
//!
//! The L1 quote is priced as if the user sold the native asset. Composition
//! swaps the longtail sell side back in and records what the Uniswap
//! V3 leg is expected to produce.

use crate::types::{compute_rate, LongtailData, TradeQuote, TradeQuoteInput, TradeType};
use alloy::primitives::{Address, U256};

/// Rewrite L1 quotes into longtail -> L1 quotes.
///
/// Every step gets the longtail sell asset/amount and `allowance_contract`;
/// buy side, fees and memo stay as the L1 quote had them.
pub fn compose_longtail_quotes(
    l1_quotes: Vec<TradeQuote>,
    input: &TradeQuoteInput,
    aggregator: Address,
    allowance_contract: Address,
    longtail_expected_amount_out: U256,
) -> Vec<TradeQuote> {
    let sell_amount = input.sell_amount_including_protocol_fees_crypto_base_unit;

    l1_quotes
        .into_iter()
        .map(|quote| {
            let steps: Vec<_> = quote
                .steps
                .into_iter()
                .map(|mut step| {
                    step.sell_asset = input.sell_asset.clone();
                    step.sell_amount_including_protocol_fees_crypto_base_unit = sell_amount;
                    step.allowance_contract = allowance_contract;
                    step.rate = compute_rate(
                        sell_amount,
                        step.sell_asset.precision,
                        step.buy_amount_after_fees_crypto_base_unit,
                        step.buy_asset.precision,
                    );
                    step
                })
                .collect();

            // single-leg THORChain quotes: the quote rate is the step rate
            let rate = steps.last().map(|s| s.rate).unwrap_or(quote.rate);

            TradeQuote {
                rate,
                steps,
                aggregator: Some(aggregator),
                trade_type: TradeType::LongTailToL1,
                is_longtail: true,
                longtail_data: Some(LongtailData {
                    longtail_to_l1_expected_amount_out: longtail_expected_amount_out,
                }),
                ..quote
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::test_support::{btc, eth, fox};
    use crate::types::{FeeData, TradeQuoteStep};
    use rust_decimal_macros::dec;

    fn l1_quote(sell_amount: U256, buy_amount: U256, is_streaming: bool) -> TradeQuote {
        TradeQuote {
            id: "l1".to_string(),
            rate: dec!(0.05),
            steps: vec![TradeQuoteStep {
                sell_asset: eth(),
                buy_asset: btc(),
                sell_amount_including_protocol_fees_crypto_base_unit: sell_amount,
                buy_amount_before_fees_crypto_base_unit: buy_amount + U256::from(10_000u64),
                buy_amount_after_fees_crypto_base_unit: buy_amount,
                allowance_contract: Address::ZERO,
                rate: dec!(0.05),
                source: "THORChain".to_string(),
                fee_data: FeeData::default(),
                estimated_execution_time_ms: Some(600_000),
            }],
            receive_address: "bc1qreceiver".to_string(),
            affiliate_bps: 0,
            memo: Some("=:BTC.BTC:bc1qreceiver".to_string()),
            aggregator: None,
            is_streaming,
            trade_type: TradeType::L1ToL1,
            is_longtail: false,
            longtail_data: None,
        }
    }

    #[test]
    fn test_compose_preserves_sell_side_and_flags() {
        let sell_amount = U256::from(1_000u64) * U256::from(10u64).pow(U256::from(18u64));
        let weth_out = U256::from(500_000_000_000_000_000u128); // 0.5 WETH
        let btc_out = U256::from(2_500_000u64); // 0.025 BTC

        let input = TradeQuoteInput {
            sell_asset: fox(),
            buy_asset: btc(),
            sell_amount_including_protocol_fees_crypto_base_unit: sell_amount,
            receive_address: "bc1qreceiver".to_string(),
            affiliate_bps: 0,
            slippage_tolerance_bps: None,
        };
        let aggregator = Address::repeat_byte(0xa9);
        let allowance = Address::repeat_byte(0xf8);

        let quotes = compose_longtail_quotes(
            vec![l1_quote(weth_out, btc_out, false), l1_quote(weth_out, btc_out, true)],
            &input,
            aggregator,
            allowance,
            weth_out,
        );

        assert_eq!(quotes.len(), 2);
        for quote in &quotes {
            assert!(quote.is_longtail);
            assert_eq!(quote.trade_type, TradeType::LongTailToL1);
            assert_eq!(quote.aggregator, Some(aggregator));
            assert_eq!(
                quote.longtail_data.map(|d| d.longtail_to_l1_expected_amount_out),
                Some(weth_out)
            );
            assert_eq!(quote.memo.as_deref(), Some("=:BTC.BTC:bc1qreceiver"));

            for step in &quote.steps {
                assert_eq!(step.sell_asset, fox());
                assert_eq!(step.sell_amount_including_protocol_fees_crypto_base_unit, sell_amount);
                assert_eq!(step.allowance_contract, allowance);
                assert_eq!(step.buy_asset, btc());
                assert_eq!(step.buy_amount_after_fees_crypto_base_unit, btc_out);
            }
            // 0.025 BTC for 1000 FOX
            assert_eq!(quote.rate, dec!(0.000025));
        }
        assert!(quotes[1].is_streaming);
    }

    #[test]
    fn test_compose_rate_for_huge_supply_token() {
        // 1e11 tokens at 18 decimals, beyond Decimal's 96-bit mantissa
        let sell_amount = U256::from(10u64).pow(U256::from(29u64));
        let weth_out = U256::from(2_000_000_000_000_000_000u128);
        let btc_out = U256::from(10_000_000u64); // 0.1 BTC

        let input = TradeQuoteInput {
            sell_asset: fox(),
            buy_asset: btc(),
            sell_amount_including_protocol_fees_crypto_base_unit: sell_amount,
            receive_address: "bc1qreceiver".to_string(),
            affiliate_bps: 0,
            slippage_tolerance_bps: None,
        };

        let quotes = compose_longtail_quotes(
            vec![l1_quote(weth_out, btc_out, false)],
            &input,
            Address::repeat_byte(0xa9),
            Address::repeat_byte(0xf8),
            weth_out,
        );

        assert_eq!(quotes[0].rate, dec!(0.000000000001));
        assert_eq!(quotes[0].steps[0].rate, dec!(0.000000000001));
    }

    #[test]
    fn test_compose_nothing_from_nothing() {
        let input = TradeQuoteInput {
            sell_asset: fox(),
            buy_asset: btc(),
            sell_amount_including_protocol_fees_crypto_base_unit: U256::from(1u64),
            receive_address: String::new(),
            affiliate_bps: 0,
            slippage_tolerance_bps: None,
        };
        let quotes =
            compose_longtail_quotes(vec![], &input, Address::ZERO, Address::ZERO, U256::ZERO);
        assert!(quotes.is_empty());
    }
}
