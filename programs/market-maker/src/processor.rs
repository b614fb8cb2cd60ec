use solana_program::{
    entrypoint::ProgramResult,
    instruction::Instruction,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    cost_function::CostFunction,
    instruction::MarketMakerInstruction,
    ledger::OutcomeLedger,
    market_maker::MarketMaker,
};

pub struct Processor;

impl Processor {
    /// Check a built instruction's program id and accounts against `maker`,
    /// then run it on behalf of its signer
    pub fn process_instruction<C: CostFunction, L: OutcomeLedger>(
        maker: &mut MarketMaker<C>,
        ledger: &mut L,
        instruction: &Instruction,
    ) -> ProgramResult {
        if instruction.program_id != crate::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let [signer, market, ..] = instruction.accounts.as_slice() else {
            return Err(ProgramError::NotEnoughAccountKeys);
        };
        if !signer.is_signer {
            msg!("Signer {} did not sign", signer.pubkey);
            return Err(ProgramError::MissingRequiredSignature);
        }
        if market.pubkey != *maker.address() || !market.is_writable {
            msg!("Account {} is not this writable market", market.pubkey);
            return Err(ProgramError::InvalidAccountData);
        }

        Self::process(maker, ledger, &signer.pubkey, &instruction.data)
    }

    /// Decode `instruction_data` and run it against `maker` on behalf of
    /// `signer`, the account that authorized the instruction
    pub fn process<C: CostFunction, L: OutcomeLedger>(
        maker: &mut MarketMaker<C>,
        ledger: &mut L,
        signer: &Pubkey,
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = MarketMakerInstruction::unpack(instruction_data)?;
        msg!("Instruction: {}", instruction.name());

        match instruction {
            MarketMakerInstruction::Fund { funding } => maker.fund(ledger, signer, funding),
            MarketMakerInstruction::Trade {
                outcome_token_amounts,
                collateral_limit,
            } => {
                let net_cost = maker.trade(ledger, signer, &outcome_token_amounts, collateral_limit)?;
                msg!("Net cost: {}", net_cost);
                Ok(())
            }
            MarketMakerInstruction::Buy {
                outcome,
                amount,
                max_cost,
            } => {
                let cost = maker.buy(ledger, signer, outcome, amount, max_cost)?;
                msg!("Bought {} of outcome {} for {}", amount, outcome, cost);
                Ok(())
            }
            MarketMakerInstruction::Sell {
                outcome,
                amount,
                min_profit,
            } => {
                let profit = maker.sell(ledger, signer, outcome, amount, min_profit)?;
                msg!("Sold {} of outcome {} for {}", amount, outcome, profit);
                Ok(())
            }
            MarketMakerInstruction::Close => maker.close(ledger, signer),
            MarketMakerInstruction::WithdrawFees => maker.withdraw_fees(ledger, signer).map(|_| ()),
        }
    }
}
