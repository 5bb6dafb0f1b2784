//! THORChain Module
//!
//! L1 -> L1 quotes from THORNode and the asset notation/precision it speaks.

pub mod client;
pub mod notation;

pub use client::{quote_from_response, ThornodeQuoteResponse, ThornodeQuoteSource};
pub use notation::{from_thor_base_unit, thor_asset_notation, to_thor_base_unit, THOR_PRECISION};
