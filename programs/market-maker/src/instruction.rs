use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::error::MarketMakerError;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum MarketMakerInstruction {
    /// Fund the market and mint its initial outcome token sets
    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Market account
    Fund {
        funding: u64,
    },

    /// Trade a vector of outcome token amounts
    /// Accounts:
    /// 0. `[signer]` Trader
    /// 1. `[writable]` Market account
    Trade {
        outcome_token_amounts: Vec<i64>,
        collateral_limit: i64,
    },

    /// Buy a single outcome
    /// Accounts:
    /// 0. `[signer]` Trader
    /// 1. `[writable]` Market account
    Buy {
        outcome: u8,
        amount: u64,
        max_cost: u64,
    },

    /// Sell a single outcome
    /// Accounts:
    /// 0. `[signer]` Trader
    /// 1. `[writable]` Market account
    Sell {
        outcome: u8,
        amount: u64,
        min_profit: u64,
    },

    /// Return all held outcome tokens to the owner and close the market
    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Market account
    Close,

    /// Send accumulated fees to the owner
    /// Accounts:
    /// 0. `[signer]` Owner
    /// 1. `[writable]` Market account
    WithdrawFees,
}

impl MarketMakerInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| MarketMakerError::InvalidInstruction.into())
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec()
            .map_err(|_| MarketMakerError::InvalidInstruction.into())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fund { .. } => "Fund",
            Self::Trade { .. } => "Trade",
            Self::Buy { .. } => "Buy",
            Self::Sell { .. } => "Sell",
            Self::Close => "Close",
            Self::WithdrawFees => "WithdrawFees",
        }
    }
}

fn build(
    program_id: &Pubkey,
    signer: &Pubkey,
    market: &Pubkey,
    instruction: MarketMakerInstruction,
) -> Result<Instruction, ProgramError> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*signer, true),
            AccountMeta::new(*market, false),
        ],
        data: instruction.pack()?,
    })
}

pub fn fund(
    program_id: &Pubkey,
    owner: &Pubkey,
    market: &Pubkey,
    funding: u64,
) -> Result<Instruction, ProgramError> {
    build(program_id, owner, market, MarketMakerInstruction::Fund { funding })
}

pub fn trade(
    program_id: &Pubkey,
    trader: &Pubkey,
    market: &Pubkey,
    outcome_token_amounts: Vec<i64>,
    collateral_limit: i64,
) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        trader,
        market,
        MarketMakerInstruction::Trade {
            outcome_token_amounts,
            collateral_limit,
        },
    )
}

pub fn buy(
    program_id: &Pubkey,
    trader: &Pubkey,
    market: &Pubkey,
    outcome: u8,
    amount: u64,
    max_cost: u64,
) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        trader,
        market,
        MarketMakerInstruction::Buy {
            outcome,
            amount,
            max_cost,
        },
    )
}

pub fn sell(
    program_id: &Pubkey,
    trader: &Pubkey,
    market: &Pubkey,
    outcome: u8,
    amount: u64,
    min_profit: u64,
) -> Result<Instruction, ProgramError> {
    build(
        program_id,
        trader,
        market,
        MarketMakerInstruction::Sell {
            outcome,
            amount,
            min_profit,
        },
    )
}

pub fn close(program_id: &Pubkey, owner: &Pubkey, market: &Pubkey) -> Result<Instruction, ProgramError> {
    build(program_id, owner, market, MarketMakerInstruction::Close)
}

pub fn withdraw_fees(program_id: &Pubkey, owner: &Pubkey, market: &Pubkey) -> Result<Instruction, ProgramError> {
    build(program_id, owner, market, MarketMakerInstruction::WithdrawFees)
}
