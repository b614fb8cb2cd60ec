//! Fixed-point math implementation
//!
//! Signed 64.64 arithmetic for pricing. Every operation is checked and
//! reports overflow as a `ProgramError`.

use solana_program::program_error::ProgramError;

use crate::error::MarketMakerError;

use super::u256::{mul_div, Rounding};

/// Upper bound on series expansion terms; each series stops early once a
/// term truncates to zero
const MAX_SERIES_TERMS: u32 = 64;

/// 64.64 fixed-point number (64 bits signed integer, 64 bits fraction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct I64F64 {
    pub raw: i128,
}

impl I64F64 {
    /// Number of fractional bits
    pub const FRACTION_BITS: u32 = 64;

    pub const ZERO: Self = Self::from_raw(0);

    pub const ONE: Self = Self::from_raw(1 << Self::FRACTION_BITS);

    /// ln 2, rounded to nearest
    pub const LN_2: Self = Self::from_raw(0xB172_17F7_D1CF_79AC);

    pub const fn from_raw(raw: i128) -> Self {
        Self { raw }
    }

    pub fn from_num(num: i64) -> Self {
        Self::from_raw((num as i128) << Self::FRACTION_BITS)
    }

    /// `numerator / denominator`, truncated toward zero
    pub fn from_fraction(numerator: i64, denominator: u64) -> Result<Self, ProgramError> {
        Self::ONE.checked_mul_div(numerator, denominator, Rounding::Down)
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn checked_add(self, other: Self) -> Result<Self, ProgramError> {
        self.raw
            .checked_add(other.raw)
            .map(Self::from_raw)
            .ok_or_else(|| MarketMakerError::ArithmeticOverflow.into())
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, ProgramError> {
        self.raw
            .checked_sub(other.raw)
            .map(Self::from_raw)
            .ok_or_else(|| MarketMakerError::ArithmeticOverflow.into())
    }

    /// Product, truncated toward zero
    pub fn checked_mul(self, other: Self) -> Result<Self, ProgramError> {
        let value = with_sign_of(self.raw, other.raw)?;
        truncating_mul_div(value, other.raw.unsigned_abs(), Self::ONE.raw as u128).map(Self::from_raw)
    }

    /// Quotient, truncated toward zero
    pub fn checked_div(self, other: Self) -> Result<Self, ProgramError> {
        if other.is_zero() {
            return Err(MarketMakerError::DivisionByZero.into());
        }
        let value = with_sign_of(self.raw, other.raw)?;
        truncating_mul_div(value, Self::ONE.raw as u128, other.raw.unsigned_abs()).map(Self::from_raw)
    }

    /// `self * numerator / denominator`, rounded toward -inf (`Down`) or
    /// +inf (`Up`)
    pub fn checked_mul_div(
        self,
        numerator: i64,
        denominator: u64,
        rounding: Rounding,
    ) -> Result<Self, ProgramError> {
        let value = with_sign_of(self.raw, numerator as i128)?;
        rounded_mul_div(
            value,
            numerator.unsigned_abs() as u128,
            denominator as u128,
            rounding,
        )
        .map(Self::from_raw)
    }

    /// `self * numerator / denominator` as a whole number, rounded toward
    /// -inf (`Down`) or +inf (`Up`). The denominator must be positive.
    pub fn mul_div_to_int(
        self,
        numerator: u64,
        denominator: Self,
        rounding: Rounding,
    ) -> Result<i128, ProgramError> {
        if denominator.raw <= 0 {
            return Err(MarketMakerError::DivisionByZero.into());
        }
        rounded_mul_div(self.raw, numerator as u128, denominator.raw as u128, rounding)
    }

    /// e^self
    pub fn exp(self) -> Result<Self, ProgramError> {
        // self = k ln 2 + r with 0 <= r < ln 2, so e^self = 2^k e^r
        let k = self.raw.div_euclid(Self::LN_2.raw);
        let r = Self::from_raw(self.raw.rem_euclid(Self::LN_2.raw));

        let mut sum = Self::ONE;
        let mut term = Self::ONE;
        for n in 1..=MAX_SERIES_TERMS {
            term = term.checked_mul(r)?.div_int(n);
            if term.is_zero() {
                break;
            }
            sum = sum.checked_add(term)?;
        }

        // e^r < 2, so the shifted raw stays below 2^127
        if k > 62 {
            return Err(MarketMakerError::ArithmeticOverflow.into());
        }
        if k >= 0 {
            return Ok(Self::from_raw(sum.raw << k));
        }
        let shift = k.unsigned_abs();
        Ok(if shift >= 127 {
            Self::ZERO
        } else {
            Self::from_raw(sum.raw >> shift)
        })
    }

    /// e^self - 1, exact to a few ulps for small arguments
    pub fn exp_m1(self) -> Result<Self, ProgramError> {
        if self.raw.unsigned_abs() >= Self::half().raw as u128 {
            return self.exp()?.checked_sub(Self::ONE);
        }

        let mut sum = Self::ZERO;
        let mut term = Self::ONE;
        for n in 1..=MAX_SERIES_TERMS {
            term = term.checked_mul(self)?.div_int(n);
            if term.is_zero() {
                break;
            }
            sum = sum.checked_add(term)?;
        }
        Ok(sum)
    }

    /// Natural logarithm, defined for positive values
    pub fn ln(self) -> Result<Self, ProgramError> {
        if self.raw <= 0 {
            return Err(MarketMakerError::ArithmeticOverflow.into());
        }

        // self = 2^k t with 1 <= t < 2
        let k = (127 - self.raw.leading_zeros()) as i128 - Self::FRACTION_BITS as i128;
        let t = if k >= 0 {
            self.raw >> k
        } else {
            self.raw << k.unsigned_abs()
        };

        // ln t = 2 atanh(u) with u = (t - 1) / (t + 1) in [0, 1/3)
        let u = Self::from_raw(t - Self::ONE.raw).checked_div(Self::from_raw(t + Self::ONE.raw))?;
        let scale = Self::LN_2
            .raw
            .checked_mul(k)
            .map(Self::from_raw)
            .ok_or(MarketMakerError::ArithmeticOverflow)?;

        two_atanh(u)?.checked_add(scale)
    }

    /// ln(1 + self), exact to a few ulps for small arguments
    pub fn ln_1p(self) -> Result<Self, ProgramError> {
        if self.raw.unsigned_abs() >= Self::half().raw as u128 {
            return Self::ONE.checked_add(self)?.ln();
        }

        // ln(1 + x) = 2 atanh(x / (2 + x))
        let two = Self::from_num(2);
        two_atanh(self.checked_div(two.checked_add(self)?)?)
    }

    fn half() -> Self {
        Self::from_raw(Self::ONE.raw >> 1)
    }

    fn div_int(self, divisor: u32) -> Self {
        Self::from_raw(self.raw / divisor as i128)
    }
}

/// 2 atanh(u) = ln((1 + u) / (1 - u)), for |u| <= 1/3
fn two_atanh(u: I64F64) -> Result<I64F64, ProgramError> {
    let u_squared = u.checked_mul(u)?;
    let mut power = u;
    let mut sum = I64F64::ZERO;
    for n in 0..MAX_SERIES_TERMS {
        let term = power.div_int(2 * n + 1);
        if term.is_zero() {
            break;
        }
        sum = sum.checked_add(term)?;
        power = power.checked_mul(u_squared)?;
    }
    sum.checked_add(sum)
}

/// `value`, negated when `sign` is negative
fn with_sign_of(value: i128, sign: i128) -> Result<i128, ProgramError> {
    if sign < 0 {
        value
            .checked_neg()
            .ok_or_else(|| MarketMakerError::ArithmeticOverflow.into())
    } else {
        Ok(value)
    }
}

fn truncating_mul_div(value: i128, mul: u128, div: u128) -> Result<i128, ProgramError> {
    scaled_magnitude(value, mul, div, Rounding::Down)
}

fn rounded_mul_div(value: i128, mul: u128, div: u128, rounding: Rounding) -> Result<i128, ProgramError> {
    // Rounding a negative result toward +inf shrinks its magnitude
    let magnitude_rounding = if value < 0 { rounding.reverse() } else { rounding };
    scaled_magnitude(value, mul, div, magnitude_rounding)
}

/// `value * mul / div` with the magnitude rounded as given and the sign of
/// `value` kept
fn scaled_magnitude(
    value: i128,
    mul: u128,
    div: u128,
    magnitude_rounding: Rounding,
) -> Result<i128, ProgramError> {
    if div == 0 {
        return Err(MarketMakerError::DivisionByZero.into());
    }
    let magnitude = mul_div(value.unsigned_abs(), mul, div, magnitude_rounding)
        .and_then(|magnitude| i128::try_from(magnitude).ok())
        .ok_or(MarketMakerError::ArithmeticOverflow)?;
    Ok(if value < 0 { -magnitude } else { magnitude })
}
