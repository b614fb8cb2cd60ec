//! Outcome token and collateral custody
//!
//! The market maker never holds balances itself. Every movement of collateral
//! or outcome tokens, and every mint or burn of a full outcome token set, goes
//! through an `OutcomeLedger` supplied by the host.

pub mod memory;

pub use memory::InMemoryLedger;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::state::OutcomeSetId;

/// A fungible balance tracked by the ledger
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Collateral,
    Outcome { set: OutcomeSetId, index: u8 },
}

/// Custodian of collateral and outcome tokens (the event manager).
///
/// Every method either applies its whole effect or returns an error with no
/// effect. A full outcome token set is one unit of every outcome token of a
/// set and is backed by one unit of collateral.
pub trait OutcomeLedger {
    /// Host-level snapshot used to discard partial effects of a failed operation
    type Checkpoint;

    /// Handle of the custodian. Mints and burns spend allowances granted to it.
    fn id(&self) -> Pubkey;

    /// Number of outcomes in `set`
    fn outcome_token_set_length(&self, set: &OutcomeSetId) -> Result<u8, ProgramError>;

    fn balance_of(&self, asset: Asset, holder: &Pubkey) -> u64;

    fn allowance(&self, asset: Asset, owner: &Pubkey, spender: &Pubkey) -> u64;

    /// Move `amount` of `asset` owned by `from` to `to`
    fn transfer(&mut self, asset: Asset, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult;

    /// Move `amount` of `asset` from `from` to `to` on behalf of `spender`,
    /// consuming the allowance `from` granted to `spender`
    fn transfer_from(
        &mut self,
        asset: Asset,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> ProgramResult;

    /// Set the allowance `owner` grants to `spender`
    fn approve(&mut self, asset: Asset, owner: &Pubkey, spender: &Pubkey, amount: u64) -> ProgramResult;

    /// Take `amount` collateral from `holder` and credit `amount` of every
    /// outcome token of `set` to it
    fn mint_outcome_token_set(&mut self, set: &OutcomeSetId, holder: &Pubkey, amount: u64) -> ProgramResult;

    /// Debit `amount` of every outcome token of `set` from `holder` and
    /// release `amount` collateral to it
    fn burn_outcome_token_set(&mut self, set: &OutcomeSetId, holder: &Pubkey, amount: u64) -> ProgramResult;

    fn checkpoint(&self) -> Self::Checkpoint;

    fn rollback(&mut self, checkpoint: Self::Checkpoint);
}
