//! In-memory custodian
//!
//! A complete `OutcomeLedger` for hosts without an external token program and
//! for simulation. Balances are conserved: collateral only enters through
//! `deposit` and outcome tokens only through full-set mints backed by it.

use std::collections::HashMap;

use solana_program::{
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::UNLIMITED_ALLOWANCE,
    error::MarketMakerError,
    state::OutcomeSetId,
};

use super::{Asset, OutcomeLedger};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LedgerState {
    outcome_sets: HashMap<OutcomeSetId, u8>,
    balances: HashMap<(Asset, Pubkey), u64>,
    allowances: HashMap<(Asset, Pubkey, Pubkey), u64>,
}

#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    id: Pubkey,
    state: LedgerState,
}

impl InMemoryLedger {
    pub fn new(id: Pubkey) -> Self {
        Self {
            id,
            state: LedgerState::default(),
        }
    }

    /// Register an outcome set of `outcome_count` outcomes
    pub fn register_outcome_set(&mut self, set: OutcomeSetId, outcome_count: u8) {
        self.state.outcome_sets.insert(set, outcome_count);
    }

    /// Credit fresh collateral to `holder`
    pub fn deposit(&mut self, holder: &Pubkey, amount: u64) -> ProgramResult {
        self.credit(Asset::Collateral, holder, amount)
    }

    /// Collateral backing all outstanding outcome token sets
    pub fn locked_collateral(&self) -> u64 {
        self.balance_of(Asset::Collateral, &self.id)
    }

    fn debit(&mut self, asset: Asset, holder: &Pubkey, amount: u64) -> ProgramResult {
        let balance = self.state.balances.entry((asset, *holder)).or_insert(0);
        *balance = balance
            .checked_sub(amount)
            .ok_or(MarketMakerError::InsufficientBalance)?;
        Ok(())
    }

    fn credit(&mut self, asset: Asset, holder: &Pubkey, amount: u64) -> ProgramResult {
        let balance = self.state.balances.entry((asset, *holder)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(MarketMakerError::ArithmeticOverflow)?;
        Ok(())
    }

    fn spend_allowance(
        &mut self,
        asset: Asset,
        owner: &Pubkey,
        spender: &Pubkey,
        amount: u64,
    ) -> ProgramResult {
        let allowance = self
            .state
            .allowances
            .entry((asset, *owner, *spender))
            .or_insert(0);
        if *allowance == UNLIMITED_ALLOWANCE {
            return Ok(());
        }
        *allowance = allowance
            .checked_sub(amount)
            .ok_or(MarketMakerError::InsufficientAllowance)?;
        Ok(())
    }

    /// A transfer must not fail after its debit has been applied
    fn check_credit(&self, asset: Asset, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult {
        if from != to {
            self.balance_of(asset, to)
                .checked_add(amount)
                .ok_or(MarketMakerError::ArithmeticOverflow)?;
        }
        Ok(())
    }

    fn check_asset(&self, asset: Asset) -> ProgramResult {
        if let Asset::Outcome { set, index } = asset {
            if index >= self.outcome_token_set_length(&set)? {
                return Err(MarketMakerError::InvalidOutcomeIndex.into());
            }
        }
        Ok(())
    }

    fn outcome_assets(&self, set: &OutcomeSetId) -> Result<Vec<Asset>, ProgramError> {
        let outcome_count = self.outcome_token_set_length(set)?;
        Ok((0..outcome_count)
            .map(|index| Asset::Outcome { set: *set, index })
            .collect())
    }
}

impl OutcomeLedger for InMemoryLedger {
    type Checkpoint = InMemoryCheckpoint;

    fn id(&self) -> Pubkey {
        self.id
    }

    fn outcome_token_set_length(&self, set: &OutcomeSetId) -> Result<u8, ProgramError> {
        self.state
            .outcome_sets
            .get(set)
            .copied()
            .ok_or_else(|| MarketMakerError::UnknownOutcomeSet.into())
    }

    fn balance_of(&self, asset: Asset, holder: &Pubkey) -> u64 {
        self.state
            .balances
            .get(&(asset, *holder))
            .copied()
            .unwrap_or(0)
    }

    fn allowance(&self, asset: Asset, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.state
            .allowances
            .get(&(asset, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, asset: Asset, from: &Pubkey, to: &Pubkey, amount: u64) -> ProgramResult {
        self.check_asset(asset)?;
        self.check_credit(asset, from, to, amount)?;
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: Asset,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> ProgramResult {
        self.check_asset(asset)?;
        if self.balance_of(asset, from) < amount {
            return Err(MarketMakerError::InsufficientBalance.into());
        }
        self.check_credit(asset, from, to, amount)?;
        self.spend_allowance(asset, from, spender, amount)?;
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount)
    }

    fn approve(&mut self, asset: Asset, owner: &Pubkey, spender: &Pubkey, amount: u64) -> ProgramResult {
        self.check_asset(asset)?;
        self.state.allowances.insert((asset, *owner, *spender), amount);
        Ok(())
    }

    fn mint_outcome_token_set(&mut self, set: &OutcomeSetId, holder: &Pubkey, amount: u64) -> ProgramResult {
        let outcomes = self.outcome_assets(set)?;
        let custodian = self.id;
        let before = self.state.clone();

        let result = self
            .transfer_from(Asset::Collateral, &custodian, holder, &custodian, amount)
            .and_then(|()| {
                outcomes
                    .into_iter()
                    .try_for_each(|asset| self.credit(asset, holder, amount))
            });
        if result.is_err() {
            self.state = before;
        } else {
            msg!("Minted {} outcome token sets for {}", amount, holder);
        }
        result
    }

    fn burn_outcome_token_set(&mut self, set: &OutcomeSetId, holder: &Pubkey, amount: u64) -> ProgramResult {
        let outcomes = self.outcome_assets(set)?;
        let custodian = self.id;
        let before = self.state.clone();

        let result = outcomes
            .into_iter()
            .try_for_each(|asset| {
                self.spend_allowance(asset, holder, &custodian, amount)?;
                self.debit(asset, holder, amount)
            })
            .and_then(|()| self.transfer(Asset::Collateral, &custodian, holder, amount));
        if result.is_err() {
            self.state = before;
        } else {
            msg!("Burned {} outcome token sets for {}", amount, holder);
        }
        result
    }

    fn checkpoint(&self) -> Self::Checkpoint {
        InMemoryCheckpoint(self.state.clone())
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        self.state = checkpoint.0;
    }
}

/// Full snapshot of an `InMemoryLedger`
#[derive(Debug, Clone)]
pub struct InMemoryCheckpoint(LedgerState);
