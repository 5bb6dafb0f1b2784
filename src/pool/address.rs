//! Uniswap V3 pool address derivation
//!
//! Pools are deployed by the factory with CREATE2, so every pool address is a
//! pure function of (factory, token0, token1, fee). Candidates are derived
//! here without touching the chain; whether a pool actually exists is decided
//! by the fetcher.

use crate::types::{FeeAmount, PoolCandidate};
use alloy::primitives::{b256, keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;
use std::collections::BTreeMap;

/// keccak256 of the UniswapV3Pool creation code (identical on every chain the
/// canonical factory is deployed to)
pub const POOL_INIT_CODE_HASH: B256 =
    b256!("e34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54");

/// Order two tokens the way the factory does (token0 < token1)
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// CREATE2 address of the pool for a token pair at one fee tier
pub fn compute_pool_address(
    factory: Address,
    token_a: Address,
    token_b: Address,
    fee: FeeAmount,
) -> Address {
    let (token0, token1) = sort_tokens(token_a, token_b);
    // salt = keccak256(abi.encode(token0, token1, fee)); uint24 pads like uint256
    let salt = keccak256((token0, token1, U256::from(fee.as_u32())).abi_encode());
    factory.create2(salt.0, POOL_INIT_CODE_HASH.0)
}

/// One candidate pool per fee tier, keyed by derived pool address
pub fn generate_pool_addresses_across_fee_range(
    factory: Address,
    token_a: Address,
    token_b: Address,
) -> BTreeMap<Address, PoolCandidate> {
    let (token0, token1) = sort_tokens(token_a, token_b);

    FeeAmount::ALL
        .into_iter()
        .map(|fee| {
            let pool = compute_pool_address(factory, token0, token1, fee);
            (pool, PoolCandidate { token0, token1, fee })
        })
        .collect()
}
