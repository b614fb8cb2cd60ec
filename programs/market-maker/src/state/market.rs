use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::{FEE_RANGE, MAX_OUTCOME_COUNT},
    error::MarketMakerError,
    fees::calc_fee,
};

/// Lifecycle stage of a market. Only ever moves forward.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Created,
    Funded,
    Closed,
}

/// Identifier of the partition of mutually exclusive outcomes a market trades
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutcomeSetId(pub [u8; 32]);

impl OutcomeSetId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Market maker account
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Market {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Address holding the market's collateral and outcome tokens
    pub address: Pubkey,

    /// Creator, the only caller allowed to fund, close and withdraw fees
    pub owner: Pubkey,

    /// Custodian that mints and burns outcome token sets
    pub event_manager: Pubkey,

    pub outcome_set: OutcomeSetId,

    pub stage: Stage,

    /// Fee numerator over FEE_RANGE
    pub fee: u64,

    /// Collateral provided by `fund`, informational only
    pub funding: u64,

    /// Cumulative signed amount of each outcome token sold to traders.
    /// Length is fixed at construction.
    pub net_outcome_tokens_sold: Vec<i64>,
}

impl Market {
    pub const DISCRIMINATOR: [u8; 8] = [77, 75, 84, 95, 77, 65, 75, 82]; // "MKT_MAKR"

    /// Serialized size for a market trading `outcome_count` outcomes
    pub const fn space(outcome_count: u8) -> usize {
        8 + // discriminator
        32 + // address
        32 + // owner
        32 + // event_manager
        32 + // outcome_set
        1 + // stage
        8 + // fee
        8 + // funding
        4 + (outcome_count as usize * 8) // net_outcome_tokens_sold
    }

    pub fn new(
        address: Pubkey,
        owner: Pubkey,
        event_manager: Pubkey,
        outcome_set: OutcomeSetId,
        fee: u64,
        outcome_count: u8,
    ) -> Result<Self, ProgramError> {
        if event_manager == Pubkey::default() {
            return Err(MarketMakerError::InvalidEventManager.into());
        }
        if fee >= FEE_RANGE {
            return Err(MarketMakerError::InvalidFee.into());
        }
        if outcome_count == 0 {
            return Err(MarketMakerError::InvalidOutcomeCount.into());
        }

        Ok(Self {
            discriminator: Self::DISCRIMINATOR,
            address,
            owner,
            event_manager,
            outcome_set,
            stage: Stage::Created,
            fee,
            funding: 0,
            net_outcome_tokens_sold: vec![0; outcome_count as usize],
        })
    }

    /// Check the invariants every stored market must satisfy
    pub fn validate(&self) -> ProgramResult {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(MarketMakerError::InvalidMarketData.into());
        }
        if self.fee >= FEE_RANGE {
            return Err(MarketMakerError::InvalidFee.into());
        }
        if self.net_outcome_tokens_sold.is_empty()
            || self.net_outcome_tokens_sold.len() > MAX_OUTCOME_COUNT as usize
        {
            return Err(MarketMakerError::InvalidOutcomeCount.into());
        }
        Ok(())
    }

    pub fn outcome_count(&self) -> u8 {
        self.net_outcome_tokens_sold.len() as u8
    }

    pub fn require_stage(&self, stage: Stage) -> ProgramResult {
        if self.stage != stage {
            return Err(MarketMakerError::InvalidStage.into());
        }
        Ok(())
    }

    pub fn require_owner(&self, caller: &Pubkey) -> ProgramResult {
        if self.owner != *caller {
            return Err(MarketMakerError::Unauthorized.into());
        }
        Ok(())
    }

    /// Fee owed on a trade whose raw cost has magnitude `outcome_token_cost`
    pub fn calc_market_fee(&self, outcome_token_cost: u64) -> u64 {
        calc_fee(outcome_token_cost, self.fee)
    }
}
