//! Trade settlement
//!
//! A trade exchanges collateral for a vector of outcome token amounts at the
//! price quoted by the market's cost function, plus the market fee. Buying
//! cost is turned into freshly minted full sets so the market only keeps the
//! fee; selling proceeds come from burning full sets.

use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    cost_function::CostFunction,
    error::MarketMakerError,
    events::{MarketEvent, OutcomeTokenTrade},
    ledger::{Asset, OutcomeLedger},
    market_maker::MarketMaker,
    state::Stage,
};

impl<C: CostFunction> MarketMaker<C> {
    /// Settle a trade of `outcome_token_amounts` for `trader`.
    ///
    /// Positive amounts are bought from the market, negative amounts sold to
    /// it. A non-zero `collateral_limit` caps the net cost (raw cost plus fee);
    /// zero means no limit. Returns the net cost, positive when the trader
    /// pays and negative when the trader receives.
    pub fn trade<L: OutcomeLedger>(
        &mut self,
        ledger: &mut L,
        trader: &Pubkey,
        outcome_token_amounts: &[i64],
        collateral_limit: i64,
    ) -> Result<i64, ProgramError> {
        self.atomically(ledger, |maker, ledger| {
            maker.settle(ledger, trader, outcome_token_amounts, collateral_limit)
        })
    }

    /// Buy `amount` of `outcome`, paying at most `max_cost` (0 for no limit).
    /// Returns the collateral paid.
    pub fn buy<L: OutcomeLedger>(
        &mut self,
        ledger: &mut L,
        trader: &Pubkey,
        outcome: u8,
        amount: u64,
        max_cost: u64,
    ) -> Result<u64, ProgramError> {
        let amounts = self.single_outcome_amounts(outcome, amount, false)?;
        let collateral_limit =
            i64::try_from(max_cost).map_err(|_| MarketMakerError::ArithmeticOverflow)?;

        let net_cost = self.trade(ledger, trader, &amounts, collateral_limit)?;
        Ok(net_cost.max(0).unsigned_abs())
    }

    /// Sell `amount` of `outcome`, receiving at least `min_profit` (0 for no
    /// limit). Returns the collateral received.
    pub fn sell<L: OutcomeLedger>(
        &mut self,
        ledger: &mut L,
        trader: &Pubkey,
        outcome: u8,
        amount: u64,
        min_profit: u64,
    ) -> Result<u64, ProgramError> {
        let amounts = self.single_outcome_amounts(outcome, amount, true)?;
        let collateral_limit = i64::try_from(min_profit)
            .ok()
            .and_then(i64::checked_neg)
            .ok_or(MarketMakerError::ArithmeticOverflow)?;

        let net_cost = self.trade(ledger, trader, &amounts, collateral_limit)?;
        Ok(net_cost.min(0).unsigned_abs())
    }

    fn single_outcome_amounts(&self, outcome: u8, amount: u64, selling: bool) -> Result<Vec<i64>, ProgramError> {
        if outcome >= self.market.outcome_count() {
            return Err(MarketMakerError::InvalidOutcomeIndex.into());
        }
        let amount = i64::try_from(amount).map_err(|_| MarketMakerError::ArithmeticOverflow)?;

        let mut amounts = vec![0; self.market.outcome_count() as usize];
        amounts[outcome as usize] = if selling { -amount } else { amount };
        Ok(amounts)
    }

    fn settle<L: OutcomeLedger>(
        &mut self,
        ledger: &mut L,
        trader: &Pubkey,
        outcome_token_amounts: &[i64],
        collateral_limit: i64,
    ) -> Result<i64, ProgramError> {
        self.market.require_stage(Stage::Funded)?;
        if outcome_token_amounts.len() != self.market.net_outcome_tokens_sold.len() {
            return Err(MarketMakerError::AmountsLengthMismatch.into());
        }

        let outcome_token_net_cost = self
            .cost_function
            .calc_net_cost(&self.market, outcome_token_amounts)?;

        let fees = self.market.calc_market_fee(outcome_token_net_cost.unsigned_abs());
        let signed_fees = i64::try_from(fees).map_err(|_| MarketMakerError::ArithmeticOverflow)?;

        let net_cost = outcome_token_net_cost
            .checked_add(signed_fees)
            .ok_or(MarketMakerError::ArithmeticOverflow)?;

        if collateral_limit != 0 && net_cost > collateral_limit {
            msg!("Net cost {} exceeds limit {}", net_cost, collateral_limit);
            return Err(MarketMakerError::SlippageExceeded.into());
        }

        // Exposure is settled before any custody call
        let net_outcome_tokens_sold = self
            .market
            .net_outcome_tokens_sold
            .iter()
            .zip(outcome_token_amounts)
            .map(|(&sold, &amount)| sold.checked_add(amount))
            .collect::<Option<Vec<i64>>>()
            .ok_or(MarketMakerError::ArithmeticOverflow)?;

        let market = &self.market;

        if outcome_token_net_cost > 0 {
            let outcome_token_cost = outcome_token_net_cost.unsigned_abs();
            ledger.transfer_from(
                Asset::Collateral,
                &market.address,
                trader,
                &market.address,
                net_cost.unsigned_abs(),
            )?;
            ledger.approve(
                Asset::Collateral,
                &market.address,
                &market.event_manager,
                outcome_token_cost,
            )?;
            ledger.mint_outcome_token_set(&market.outcome_set, &market.address, outcome_token_cost)?;
        }

        for (index, &amount) in outcome_token_amounts.iter().enumerate() {
            let asset = Asset::Outcome {
                set: market.outcome_set,
                index: index as u8,
            };
            if amount < 0 {
                ledger.transfer_from(asset, &market.address, trader, &market.address, amount.unsigned_abs())?;
            } else if amount > 0 {
                ledger.transfer(asset, &market.address, trader, amount.unsigned_abs())?;
            }
        }

        if outcome_token_net_cost < 0 {
            ledger.burn_outcome_token_set(
                &market.outcome_set,
                &market.address,
                outcome_token_net_cost.unsigned_abs(),
            )?;
            if net_cost < 0 {
                ledger.transfer(Asset::Collateral, &market.address, trader, net_cost.unsigned_abs())?;
            }
        }

        self.market.net_outcome_tokens_sold = net_outcome_tokens_sold;
        self.record(MarketEvent::Trade(OutcomeTokenTrade {
            transactor: *trader,
            outcome_token_amounts: outcome_token_amounts.to_vec(),
            outcome_token_net_cost,
            market_fees: fees,
        }));

        msg!(
            "Trade settled: raw cost {}, fee {}, net cost {}",
            outcome_token_net_cost,
            fees,
            net_cost
        );
        Ok(net_cost)
    }
}
