use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum MarketMakerError {
    #[error("Invalid instruction")]
    InvalidInstruction = 0,

    #[error("Invalid event manager")]
    InvalidEventManager = 1,

    #[error("Fee must be below fee range")]
    InvalidFee = 2,

    #[error("Invalid outcome count")]
    InvalidOutcomeCount = 3,

    #[error("Operation not allowed in current stage")]
    InvalidStage = 4,

    #[error("Caller is not the market owner")]
    Unauthorized = 5,

    #[error("Trade amounts do not match outcome count")]
    AmountsLengthMismatch = 6,

    #[error("Invalid outcome index")]
    InvalidOutcomeIndex = 7,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 8,

    #[error("Division by zero")]
    DivisionByZero = 9,

    #[error("Net cost exceeds collateral limit")]
    SlippageExceeded = 10,

    #[error("Insufficient balance")]
    InsufficientBalance = 11,

    #[error("Insufficient allowance")]
    InsufficientAllowance = 12,

    #[error("Unknown outcome set")]
    UnknownOutcomeSet = 13,

    #[error("Invalid market account data")]
    InvalidMarketData = 14,
}

impl PrintProgramError for MarketMakerError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("MarketMakerError: {}", self);
    }
}

impl From<MarketMakerError> for ProgramError {
    fn from(e: MarketMakerError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for MarketMakerError {
    fn type_of() -> &'static str {
        "MarketMakerError"
    }
}
