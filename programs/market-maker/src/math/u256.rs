//! 256-bit intermediates for 128-bit multiply-then-divide
//!
//! Fixed-point products of two `u128` raws need up to 256 bits before they
//! are divided back down.

/// Direction a quotient is rounded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

impl Rounding {
    pub fn reverse(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
        }
    }
}

/// 256-bit unsigned integer represented as two u128 values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256 {
    /// Low 128 bits
    pub lo: u128,
    /// High 128 bits
    pub hi: u128,
}

impl U256 {
    pub const ZERO: Self = Self { lo: 0, hi: 0 };

    pub const fn from_u128(val: u128) -> Self {
        Self { lo: val, hi: 0 }
    }

    /// Full product of two u128 values
    pub fn full_mul(a: u128, b: u128) -> Self {
        const MASK: u128 = u64::MAX as u128;

        let (a0, a1) = (a & MASK, a >> 64);
        let (b0, b1) = (b & MASK, b >> 64);

        let p00 = a0 * b0;
        let p01 = a0 * b1;
        let p10 = a1 * b0;
        let p11 = a1 * b1;

        // Below 3 * 2^64, cannot overflow
        let middle = (p00 >> 64) + (p01 & MASK) + (p10 & MASK);

        Self {
            lo: (p00 & MASK) | (middle << 64),
            hi: p11 + (p01 >> 64) + (p10 >> 64) + (middle >> 64),
        }
    }

    fn bit(&self, index: u32) -> u128 {
        if index < 128 {
            (self.lo >> index) & 1
        } else {
            (self.hi >> (index - 128)) & 1
        }
    }

    fn set_bit(&mut self, index: u32) {
        if index < 128 {
            self.lo |= 1 << index;
        } else {
            self.hi |= 1 << (index - 128);
        }
    }

    /// Quotient and remainder of division by a u128
    pub fn div_rem(&self, divisor: u128) -> Option<(Self, u128)> {
        if divisor == 0 {
            return None;
        }
        if self.hi == 0 {
            return Some((Self::from_u128(self.lo / divisor), self.lo % divisor));
        }

        // Binary long division; the remainder stays below the divisor
        let mut quotient = Self::ZERO;
        let mut remainder = 0u128;
        for index in (0..256).rev() {
            let carry = remainder >> 127;
            remainder = (remainder << 1) | self.bit(index);
            if carry == 1 || remainder >= divisor {
                remainder = remainder.wrapping_sub(divisor);
                quotient.set_bit(index);
            }
        }
        Some((quotient, remainder))
    }
}

/// `a * b / denominator` with a 256-bit intermediate. `None` on a zero
/// denominator or a quotient above u128.
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    let (quotient, remainder) = U256::full_mul(a, b).div_rem(denominator)?;
    if quotient.hi != 0 {
        return None;
    }
    match rounding {
        Rounding::Up if remainder != 0 => quotient.lo.checked_add(1),
        _ => Some(quotient.lo),
    }
}
