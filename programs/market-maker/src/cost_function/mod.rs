//! Pricing strategies
//!
//! A cost function maps a proposed change in net outcome token exposure to
//! the signed collateral cost of that change, evaluated against the market's
//! current `net_outcome_tokens_sold`. The market maker never inlines pricing.

pub mod lmsr;

pub use lmsr::Lmsr;

use solana_program::program_error::ProgramError;

use crate::state::Market;

pub trait CostFunction {
    /// Signed collateral cost of moving exposure by `outcome_token_amounts`.
    /// Positive means the trader pays, negative means the trader receives.
    ///
    /// Implementations must return exactly 0 for the zero vector and must not
    /// fail for exposure reachable from a funded market.
    fn calc_net_cost(
        &self,
        market: &Market,
        outcome_token_amounts: &[i64],
    ) -> Result<i64, ProgramError>;
}

impl<F> CostFunction for F
where
    F: Fn(&Market, &[i64]) -> Result<i64, ProgramError>,
{
    fn calc_net_cost(
        &self,
        market: &Market,
        outcome_token_amounts: &[i64],
    ) -> Result<i64, ProgramError> {
        self(market, outcome_token_amounts)
    }
}
