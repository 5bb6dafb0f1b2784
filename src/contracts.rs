//! Contract Definitions
//!
//! Solidity interfaces used by the longtail leg, defined with alloy's `sol!`
//! macro. `#[sol(rpc)]` generates contract instance types that make calls
//! through any alloy Provider.
//!
//! Created: 2026-10-16

use alloy::sol;

// ── Uniswap V3 ───────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface UniswapV3Pool {
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

// QuoterV1 is not a view function (it reverts internally to return data),
// so it is only ever eth_call'ed, never sent.
sol! {
    #[sol(rpc)]
    interface IQuoter {
        function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) external returns (uint256 amountOut);
    }
}
