//! Per-pool output quotes
//!
//! Simulates Uniswap QuoterV1 `quoteExactInputSingle` through `eth_call` for
//! every confirmed pool. Queries are independent and run concurrently; a pool
//! that reverts (not enough liquidity, uninitialized tick range) or quotes zero
//! is left out of the result.

use crate::contracts::IQuoter;
use crate::types::{FeeAmount, PoolContractData};
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Fee tier as the quoter's `uint24` argument (no `From<u32>` for `U24`)
fn fee_to_u24(fee: u32) -> U24 {
    debug_assert!(fee <= 0xFFFFFF, "fee {} exceeds U24 max (16777215)", fee);
    U24::from_limbs([fee as u64])
}

/// Non-state-changing exact-input quote for a single V3 pool
#[async_trait]
pub trait QuoteSimulator: Send + Sync {
    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        fee: FeeAmount,
        amount_in: U256,
    ) -> Result<U256>;
}

/// QuoteSimulator backed by an alloy provider and a deployed QuoterV1
pub struct RpcQuoter<P> {
    provider: Arc<P>,
    quoter_address: Address,
}

impl<P: Provider + 'static> RpcQuoter<P> {
    pub fn new(provider: Arc<P>, quoter_address: Address) -> Self {
        Self {
            provider,
            quoter_address,
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> QuoteSimulator for RpcQuoter<P> {
    async fn quote_exact_input_single(
        &self,
        token_in: Address,
        token_out: Address,
        fee: FeeAmount,
        amount_in: U256,
    ) -> Result<U256> {
        let quoter = IQuoter::new(self.quoter_address, self.provider.clone());

        // sqrtPriceLimitX96 = 0 (no price limit)
        let amount_out = quoter
            .quoteExactInputSingle(token_in, token_out, fee_to_u24(fee.as_u32()), amount_in, U160::ZERO)
            .call()
            .await
            .with_context(|| format!("Quoter call failed @ {} fee", fee))?;

        Ok(amount_out)
    }
}

/// Quote `amount_in` of `token_in` through each pool.
///
/// Returns pool -> amount out (token_out base units). Pools whose quote fails
/// or comes back zero are absent, never zero-filled.
pub async fn fetch_quoted_amount_out_by_pool<Q: QuoteSimulator + ?Sized>(
    pools: &BTreeMap<Address, PoolContractData>,
    amount_in: U256,
    token_in: Address,
    simulator: &Q,
    max_concurrent: usize,
) -> BTreeMap<Address, U256> {
    let quotes: BTreeMap<Address, U256> = stream::iter(pools.values())
        .map(|&data| async move {
            let token_out = if data.token0 == token_in {
                data.token1
            } else {
                data.token0
            };

            match simulator
                .quote_exact_input_single(token_in, token_out, data.fee, amount_in)
                .await
            {
                Ok(amount_out) if amount_out.is_zero() => {
                    debug!("Pool {:?} @ {} quoted zero, no executable depth", data.pool, data.fee);
                    None
                }
                Ok(amount_out) => {
                    debug!("Pool {:?} @ {} quoted {}", data.pool, data.fee, amount_out);
                    Some((data.pool, amount_out))
                }
                Err(e) => {
                    debug!("Pool {:?} @ {} quote failed: {:#}", data.pool, data.fee, e);
                    None
                }
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .filter_map(|quote| async move { quote })
        .collect()
        .await;

    debug!("{} of {} pools produced a quote", quotes.len(), pools.len());
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const FOX: Address = address!("c770eefad204b5180df6a14ee197d99d808ee52d");
    const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

    /// Quotes by fee tier; tiers not in the map revert
    struct MockSimulator {
        by_fee: HashMap<FeeAmount, U256>,
        calls: Mutex<Vec<(Address, Address, FeeAmount, U256)>>,
    }

    #[async_trait]
    impl QuoteSimulator for MockSimulator {
        async fn quote_exact_input_single(
            &self,
            token_in: Address,
            token_out: Address,
            fee: FeeAmount,
            amount_in: U256,
        ) -> Result<U256> {
            self.calls
                .lock()
                .unwrap()
                .push((token_in, token_out, fee, amount_in));
            self.by_fee
                .get(&fee)
                .copied()
                .ok_or_else(|| anyhow!("execution reverted: SPL"))
        }
    }

    fn pool(byte: u8, fee: FeeAmount) -> PoolContractData {
        let (token0, token1) = crate::pool::sort_tokens(FOX, WETH);
        PoolContractData {
            pool: Address::repeat_byte(byte),
            token0,
            token1,
            fee,
        }
    }

    fn pools(entries: &[PoolContractData]) -> BTreeMap<Address, PoolContractData> {
        entries.iter().map(|p| (p.pool, *p)).collect()
    }

    #[test]
    fn test_fee_to_u24() {
        assert_eq!(fee_to_u24(3000).to::<u32>(), 3000);
    }

    #[tokio::test]
    async fn test_failures_are_omitted_not_zero_filled() {
        let pools = pools(&[
            pool(0x01, FeeAmount::Low),
            pool(0x02, FeeAmount::Medium),
            pool(0x03, FeeAmount::High),
        ]);
        let simulator = MockSimulator {
            by_fee: HashMap::from([
                (FeeAmount::Low, U256::from(900u64)),
                (FeeAmount::High, U256::ZERO),
            ]),
            calls: Mutex::new(Vec::new()),
        };

        let quotes =
            fetch_quoted_amount_out_by_pool(&pools, U256::from(1_000u64), FOX, &simulator, 8).await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[&Address::repeat_byte(0x01)], U256::from(900u64));
        // every pool was still queried
        assert_eq!(simulator.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_quotes_sell_token_into_counterpart() {
        let pools = pools(&[pool(0x01, FeeAmount::Medium)]);
        let simulator = MockSimulator {
            by_fee: HashMap::from([(FeeAmount::Medium, U256::from(5u64))]),
            calls: Mutex::new(Vec::new()),
        };

        fetch_quoted_amount_out_by_pool(&pools, U256::from(42u64), FOX, &simulator, 1).await;

        let calls = simulator.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[(FOX, WETH, FeeAmount::Medium, U256::from(42u64))]
        );
    }
}
