//! Integer math for pricing
//!
//! Contains the fixed-point type and its wide intermediates

pub mod fixed_point;
pub mod u256;

pub use fixed_point::I64F64;
pub use u256::{mul_div, Rounding, U256};
