//! Best-rate selection

use alloy::primitives::{Address, U256};
use std::collections::BTreeMap;

/// Pool with the largest quoted output.
///
/// Ties go to the first maximum in iteration order, i.e. the lowest pool
/// address. `None` when there is nothing to choose from.
pub fn select_best_rate(quotes: &BTreeMap<Address, U256>) -> Option<(Address, U256)> {
    quotes
        .iter()
        .fold(None, |best, (&pool, &amount_out)| match best {
            Some((_, best_out)) if best_out >= amount_out => best,
            _ => Some((pool, amount_out)),
        })
}
