//! Proportional market fee
//!
//! The fee is a fraction `fee / FEE_RANGE` of the magnitude of a trade's raw
//! cost, rounded down. It never exceeds the cost it is charged on.

use crate::constants::FEE_RANGE;

/// Fee owed on `outcome_token_cost` at rate `fee / FEE_RANGE`.
///
/// The product is taken in u128 so it cannot wrap before the division.
pub fn calc_fee(outcome_token_cost: u64, fee: u64) -> u64 {
    let scaled = outcome_token_cost as u128 * fee as u128 / FEE_RANGE as u128;
    // fee < FEE_RANGE keeps the quotient at or below the cost
    scaled.min(outcome_token_cost as u128) as u64
}
