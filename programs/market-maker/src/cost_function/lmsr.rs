//! Logarithmic market scoring rule
//!
//! C(q) = b * ln(Σ e^(q_i/b)) with liquidity b = funding / ln(n), which bounds
//! the market's worst-case loss by its funding. Quotes are computed in 64.64
//! fixed point and rounded toward the market.

use solana_program::program_error::ProgramError;

use crate::{
    constants::PRICE_PRECISION,
    error::MarketMakerError,
    math::{I64F64, Rounding},
    state::Market,
};

use super::CostFunction;

/// Trades moving no exponent further than 1/2 are priced through e^x - 1
/// and ln(1 + x), which keep small quotes within a few ulps
const SMALL_TRADE_EXPONENT: i128 = 1 << (I64F64::FRACTION_BITS - 1);

/// Truncation allowance for a small trade, in ulps: a fixed part plus a part
/// per outcome
const SMALL_TRADE_ERROR_ULPS: (i128, i128) = (8, 2);

/// Truncation allowance for a large trade, dominated by two full logarithms
const LARGE_TRADE_ERROR_ULPS: (i128, i128) = (64, 16);

/// Relative allowance: magnitudes involved are shifted right by this much
const RELATIVE_ERROR_SHIFT: u32 = 52;

#[derive(Debug, Clone, Copy, Default)]
pub struct Lmsr;

impl Lmsr {
    /// Liquidity parameter b for `market`
    pub fn liquidity(market: &Market) -> Result<I64F64, ProgramError> {
        let ln_outcome_count = Self::ln_outcome_count(market)?;
        let funding =
            i64::try_from(market.funding).map_err(|_| MarketMakerError::ArithmeticOverflow)?;
        I64F64::from_num(funding).checked_div(ln_outcome_count)
    }

    /// Marginal price of `outcome`, scaled by PRICE_PRECISION.
    /// Prices over all outcomes sum to PRICE_PRECISION up to rounding.
    pub fn calc_marginal_price(market: &Market, outcome: u8) -> Result<u64, ProgramError> {
        let index = outcome as usize;
        if index >= market.net_outcome_tokens_sold.len() {
            return Err(MarketMakerError::InvalidOutcomeIndex.into());
        }
        let ln_outcome_count = Self::ln_outcome_count(market)?;
        let exponents = Self::exponents(
            market,
            market.net_outcome_tokens_sold.iter().copied(),
            ln_outcome_count,
            Rounding::Down,
        )?;
        let (_, weights) = shifted_exponentials(&exponents)?;
        let total = checked_sum(&weights)?;

        // Round half up
        let doubled = weights[index].mul_div_to_int(2 * PRICE_PRECISION, total, Rounding::Down)?;
        u64::try_from((doubled + 1) / 2).map_err(|_| MarketMakerError::ArithmeticOverflow.into())
    }

    fn ln_outcome_count(market: &Market) -> Result<I64F64, ProgramError> {
        let outcome_count = market.outcome_count();
        if outcome_count < 2 {
            return Err(MarketMakerError::InvalidOutcomeCount.into());
        }
        if market.funding == 0 {
            return Err(MarketMakerError::DivisionByZero.into());
        }
        I64F64::from_num(outcome_count as i64).ln()
    }

    /// q / b = q ln(n) / funding for each quantity
    fn exponents(
        market: &Market,
        quantities: impl IntoIterator<Item = i64>,
        ln_outcome_count: I64F64,
        rounding: Rounding,
    ) -> Result<Vec<I64F64>, ProgramError> {
        quantities
            .into_iter()
            .map(|quantity| ln_outcome_count.checked_mul_div(quantity, market.funding, rounding))
            .collect()
    }
}

impl CostFunction for Lmsr {
    fn calc_net_cost(
        &self,
        market: &Market,
        outcome_token_amounts: &[i64],
    ) -> Result<i64, ProgramError> {
        if outcome_token_amounts.len() != market.net_outcome_tokens_sold.len() {
            return Err(MarketMakerError::AmountsLengthMismatch.into());
        }
        if outcome_token_amounts.iter().all(|&amount| amount == 0) {
            return Ok(0);
        }
        let ln_outcome_count = Self::ln_outcome_count(market)?;
        let sold = &market.net_outcome_tokens_sold;

        // C grows with every exponent after the trade, so those round up
        let before = Self::exponents(market, sold.iter().copied(), ln_outcome_count, Rounding::Down)?;
        let moves = Self::exponents(
            market,
            outcome_token_amounts.iter().copied(),
            ln_outcome_count,
            Rounding::Up,
        )?;

        let small = moves
            .iter()
            .all(|exponent| exponent.raw.unsigned_abs() <= SMALL_TRADE_EXPONENT as u128);
        let (delta, error) = if small {
            small_trade_delta(&before, &moves)?
        } else {
            let after = sold
                .iter()
                .zip(outcome_token_amounts)
                .map(|(&quantity, &amount)| {
                    quantity
                        .checked_add(amount)
                        .ok_or(MarketMakerError::ArithmeticOverflow)
                })
                .collect::<Result<Vec<i64>, _>>()?;
            let after = Self::exponents(market, after, ln_outcome_count, Rounding::Up)?;
            large_trade_delta(&before, &after)?
        };

        // b * (delta + error) = (delta + error) * funding / ln(n), rounded up
        // so the market never undercharges
        let cost = delta
            .checked_add(error)?
            .mul_div_to_int(market.funding, ln_outcome_count, Rounding::Up)?;
        i64::try_from(cost).map_err(|_| MarketMakerError::ArithmeticOverflow.into())
    }
}

/// C(q + a) - C(q) over b, as ln(1 + Σ p_i (e^(a_i/b) - 1)) with p the
/// current prices, and its truncation allowance
fn small_trade_delta(
    before: &[I64F64],
    moves: &[I64F64],
) -> Result<(I64F64, I64F64), ProgramError> {
    let (_, weights) = shifted_exponentials(before)?;
    let total = checked_sum(&weights)?;

    let mut growth = I64F64::ZERO;
    let mut magnitude = 0u128;
    for (weight, exponent) in weights.iter().zip(moves) {
        let change = exponent.exp_m1()?;
        growth = growth.checked_add(weight.checked_mul(change)?)?;
        magnitude = magnitude.saturating_add(change.raw.unsigned_abs());
    }

    let delta = growth.checked_div(total)?.ln_1p()?;
    let magnitude = magnitude.saturating_add(delta.raw.unsigned_abs());
    Ok((delta, error_allowance(SMALL_TRADE_ERROR_ULPS, before.len(), magnitude)))
}

/// C(q + a) - C(q) over b as a difference of log-sum-exps, and its
/// truncation allowance
fn large_trade_delta(
    before: &[I64F64],
    after: &[I64F64],
) -> Result<(I64F64, I64F64), ProgramError> {
    let delta = log_sum_exp(after)?.checked_sub(log_sum_exp(before)?)?;
    Ok((
        delta,
        error_allowance(LARGE_TRADE_ERROR_ULPS, before.len(), delta.raw.unsigned_abs()),
    ))
}

fn error_allowance((fixed, per_outcome): (i128, i128), outcome_count: usize, magnitude: u128) -> I64F64 {
    let relative = (magnitude >> RELATIVE_ERROR_SHIFT) as i128;
    I64F64::from_raw(fixed + per_outcome * outcome_count as i128 + relative)
}

/// ln(Σ e^x_i), shifted by the largest exponent to stay in range
fn log_sum_exp(exponents: &[I64F64]) -> Result<I64F64, ProgramError> {
    let (max, weights) = shifted_exponentials(exponents)?;
    max.checked_add(checked_sum(&weights)?.ln()?)
}

/// The largest exponent, and e^(x_i - max) for every exponent
fn shifted_exponentials(exponents: &[I64F64]) -> Result<(I64F64, Vec<I64F64>), ProgramError> {
    let max = exponents
        .iter()
        .copied()
        .max()
        .ok_or(MarketMakerError::InvalidOutcomeCount)?;
    let weights = exponents
        .iter()
        .map(|exponent| exponent.checked_sub(max)?.exp())
        .collect::<Result<Vec<_>, _>>()?;
    Ok((max, weights))
}

fn checked_sum(values: &[I64F64]) -> Result<I64F64, ProgramError> {
    values
        .iter()
        .try_fold(I64F64::ZERO, |sum, &value| sum.checked_add(value))
}
