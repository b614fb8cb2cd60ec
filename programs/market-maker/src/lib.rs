// Outcome-token market maker
// Native Solana implementation - NO ANCHOR

pub mod constants;
pub mod cost_function;
pub mod error;
pub mod events;
pub mod fees;
pub mod instruction;
pub mod ledger;
pub mod market_maker;
pub mod math;
pub mod processor;
pub mod settlement;
pub mod state;

pub use cost_function::{CostFunction, Lmsr};
pub use error::MarketMakerError;
pub use ledger::{Asset, InMemoryLedger, OutcomeLedger};
pub use market_maker::MarketMaker;
pub use state::{Market, OutcomeSetId, Stage};

// Declare program ID
solana_program::declare_id!("MktMaker11111111111111111111111111111111111");
