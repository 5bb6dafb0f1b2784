//! Uniswap V3 pool discovery
//!
//! Derives candidate pool addresses for a token pair across every fee tier,
//! then confirms which of them exist on-chain.

pub mod address;
pub mod fetcher;

pub use address::{
    compute_pool_address, generate_pool_addresses_across_fee_range, sort_tokens,
    POOL_INIT_CODE_HASH,
};
pub use fetcher::{fetch_contract_data_by_pool, PoolReader, RpcPoolReader};
