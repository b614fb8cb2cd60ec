//! Market maker constants

/// Denominator of the fee fraction. A fee of `FEE_RANGE / 100` is 1%.
pub const FEE_RANGE: u64 = 1_000_000_000_000_000_000;

/// Scale of marginal prices reported by cost functions (6 decimals)
pub const PRICE_PRECISION: u64 = 1_000_000;

/// Outcome indices are `u8`
pub const MAX_OUTCOME_COUNT: u8 = u8::MAX;

/// Allowance value treated as unlimited by custodians
pub const UNLIMITED_ALLOWANCE: u64 = u64::MAX;
