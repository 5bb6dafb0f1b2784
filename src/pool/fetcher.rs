//! Pool existence checks
//!
//! Reads `token0()`/`token1()` from every candidate pool concurrently. A
//! candidate only survives if both calls succeed and report the requested
//! pair; anything else (no code at the address, revert, zero address) drops
//! the candidate without failing the batch.

use crate::contracts::UniswapV3Pool;
use crate::pool::address::sort_tokens;
use crate::types::{PoolCandidate, PoolContractData};
use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Read access to V3 pool token identities
#[async_trait]
pub trait PoolReader: Send + Sync {
    /// (token0, token1) as reported by the pool contract
    async fn pool_tokens(&self, pool: Address) -> Result<(Address, Address)>;
}

/// PoolReader backed by an alloy provider
pub struct RpcPoolReader<P> {
    provider: Arc<P>,
}

impl<P: Provider + 'static> RpcPoolReader<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider + 'static> PoolReader for RpcPoolReader<P> {
    async fn pool_tokens(&self, pool: Address) -> Result<(Address, Address)> {
        let contract = UniswapV3Pool::new(pool, self.provider.clone());
        let token0_call = contract.token0();
        let token1_call = contract.token1();
        let (token0, token1) = tokio::join!(token0_call.call(), token1_call.call());

        Ok((
            token0.context("Failed to get token0")?,
            token1.context("Failed to get token1")?,
        ))
    }
}

/// Keep the candidates that exist on-chain for the (token_a, token_b) pair.
///
/// At most `max_concurrent` reads are in flight at once.
pub async fn fetch_contract_data_by_pool<R: PoolReader + ?Sized>(
    candidates: &BTreeMap<Address, PoolCandidate>,
    reader: &R,
    token_a: Address,
    token_b: Address,
    max_concurrent: usize,
) -> BTreeMap<Address, PoolContractData> {
    let expected = sort_tokens(token_a, token_b);

    let pools: BTreeMap<Address, PoolContractData> = stream::iter(candidates.iter())
        .map(|(&pool, &candidate)| async move {
            match reader.pool_tokens(pool).await {
                Ok((token0, token1)) if token0.is_zero() || token1.is_zero() => {
                    debug!("Pool {:?} @ {} returned zero token address", pool, candidate.fee);
                    None
                }
                Ok((token0, token1)) if (token0, token1) != expected => {
                    debug!(
                        "Pool {:?} @ {} holds {:?}/{:?}, not the requested pair",
                        pool, candidate.fee, token0, token1
                    );
                    None
                }
                Ok((token0, token1)) => Some((
                    pool,
                    PoolContractData {
                        pool,
                        token0,
                        token1,
                        fee: candidate.fee,
                    },
                )),
                Err(e) => {
                    debug!("No V3 pool at {:?} @ {}: {:#}", pool, candidate.fee, e);
                    None
                }
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .filter_map(|found| async move { found })
        .collect()
        .await;

    debug!("{} of {} candidate pools exist", pools.len(), candidates.len());
    pools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::address::generate_pool_addresses_across_fee_range;
    use crate::types::FeeAmount;
    use alloy::primitives::address;
    use anyhow::anyhow;
    use std::collections::HashMap;

    const FACTORY: Address = address!("1f98431c8ad98523631ae4a59f267346ea31f984");
    const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    const FOX: Address = address!("c770eefad204b5180df6a14ee197d99d808ee52d");
    const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

    /// Pools not in the map revert
    struct MockReader {
        tokens: HashMap<Address, (Address, Address)>,
    }

    #[async_trait]
    impl PoolReader for MockReader {
        async fn pool_tokens(&self, pool: Address) -> Result<(Address, Address)> {
            self.tokens
                .get(&pool)
                .copied()
                .ok_or_else(|| anyhow!("execution reverted"))
        }
    }

    fn pool_for(candidates: &BTreeMap<Address, PoolCandidate>, fee: FeeAmount) -> Address {
        candidates
            .iter()
            .find(|(_, c)| c.fee == fee)
            .map(|(pool, _)| *pool)
            .unwrap()
    }

    #[tokio::test]
    async fn test_keeps_only_existing_pools() {
        let candidates = generate_pool_addresses_across_fee_range(FACTORY, FOX, WETH);
        let (token0, token1) = sort_tokens(FOX, WETH);

        let low = pool_for(&candidates, FeeAmount::Low);
        let medium = pool_for(&candidates, FeeAmount::Medium);
        let high = pool_for(&candidates, FeeAmount::High);

        let reader = MockReader {
            tokens: HashMap::from([
                (low, (token0, token1)),
                (medium, (token0, token1)),
                // deployed but uninitialized: reports zero addresses
                (high, (Address::ZERO, Address::ZERO)),
            ]),
        };

        let pools = fetch_contract_data_by_pool(&candidates, &reader, FOX, WETH, 2).await;

        assert_eq!(pools.len(), 2);
        assert_eq!(pools[&low].fee, FeeAmount::Low);
        assert_eq!(pools[&medium].fee, FeeAmount::Medium);
        assert_eq!(pools[&medium].token0, token0);
        assert!(!pools.contains_key(&high));
    }

    #[tokio::test]
    async fn test_excludes_pool_holding_other_pair() {
        let candidates = generate_pool_addresses_across_fee_range(FACTORY, FOX, WETH);
        let low = pool_for(&candidates, FeeAmount::Low);

        let reader = MockReader {
            tokens: HashMap::from([(low, sort_tokens(USDC, WETH))]),
        };

        let pools = fetch_contract_data_by_pool(&candidates, &reader, FOX, WETH, 4).await;
        assert!(pools.is_empty());
    }

    #[tokio::test]
    async fn test_all_reverting_yields_empty_map() {
        let candidates = generate_pool_addresses_across_fee_range(FACTORY, FOX, WETH);
        let reader = MockReader {
            tokens: HashMap::new(),
        };

        // Zero concurrency is clamped rather than stalling the stream
        let pools = fetch_contract_data_by_pool(&candidates, &reader, FOX, WETH, 0).await;
        assert!(pools.is_empty());
    }
}
