//! Market lifecycle
//!
//! `MarketMaker` owns one `Market` and its pricing strategy. Lifecycle calls
//! move the market Created -> Funded -> Closed; `trade` lives in
//! `settlement`. Every mutating call runs through `atomically`, so a failure
//! at any step leaves the market, its journal and the ledger as they were.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::UNLIMITED_ALLOWANCE,
    cost_function::CostFunction,
    error::MarketMakerError,
    events::{FeeWithdrawal, MarketClosing, MarketEvent, MarketFunding},
    ledger::{Asset, OutcomeLedger},
    state::{Market, OutcomeSetId, Stage},
};

pub struct MarketMaker<C: CostFunction> {
    pub(crate) market: Market,
    pub(crate) cost_function: C,
    pub(crate) events: Vec<MarketEvent>,
}

impl<C: CostFunction> MarketMaker<C> {
    /// Create a market trading `outcome_set` through `ledger`.
    ///
    /// `event_manager` must be the ledger's handle. On success the ledger is
    /// granted unlimited authority over every outcome token the market holds,
    /// which lets it burn sets on the market's behalf.
    pub fn new<L: OutcomeLedger>(
        ledger: &mut L,
        cost_function: C,
        address: Pubkey,
        owner: Pubkey,
        event_manager: Pubkey,
        outcome_set: OutcomeSetId,
        fee: u64,
    ) -> Result<Self, ProgramError> {
        if event_manager == Pubkey::default() || event_manager != ledger.id() {
            return Err(MarketMakerError::InvalidEventManager.into());
        }
        let outcome_count = ledger.outcome_token_set_length(&outcome_set)?;
        let market = Market::new(address, owner, event_manager, outcome_set, fee, outcome_count)?;

        let checkpoint = ledger.checkpoint();
        let approved = (0..outcome_count).try_for_each(|index| {
            ledger.approve(
                Asset::Outcome { set: outcome_set, index },
                &address,
                &event_manager,
                UNLIMITED_ALLOWANCE,
            )
        });
        if let Err(err) = approved {
            ledger.rollback(checkpoint);
            return Err(err);
        }

        msg!(
            "Market {} created with {} outcomes, fee {}",
            address,
            outcome_count,
            fee
        );

        Ok(Self {
            market,
            cost_function,
            events: Vec::new(),
        })
    }

    /// Restore a market maker from serialized account data
    pub fn load(data: &[u8], cost_function: C) -> Result<Self, ProgramError> {
        let market = Market::try_from_slice(data)
            .map_err(|_| ProgramError::from(MarketMakerError::InvalidMarketData))?;
        market.validate()?;
        Ok(Self {
            market,
            cost_function,
            events: Vec::new(),
        })
    }

    /// Serialize the market into account data
    pub fn save(&self, data: &mut [u8]) -> ProgramResult {
        self.market
            .serialize(&mut &mut data[..])
            .map_err(|_| MarketMakerError::InvalidMarketData.into())
    }

    /// Fund the market with `funding` collateral from the owner and mint a
    /// full outcome token set of that size held by the market
    pub fn fund<L: OutcomeLedger>(&mut self, ledger: &mut L, caller: &Pubkey, funding: u64) -> ProgramResult {
        self.atomically(ledger, |maker, ledger| {
            maker.market.require_stage(Stage::Created)?;
            maker.market.require_owner(caller)?;

            let market = &maker.market;
            ledger.transfer_from(
                Asset::Collateral,
                &market.address,
                caller,
                &market.address,
                funding,
            )?;
            ledger.approve(
                Asset::Collateral,
                &market.address,
                &market.event_manager,
                funding,
            )?;
            ledger.mint_outcome_token_set(&market.outcome_set, &market.address, funding)?;

            maker.market.funding = funding;
            maker.market.stage = Stage::Funded;
            maker.record(MarketEvent::Funding(MarketFunding { funding }));
            msg!("Market funded with {}", funding);
            Ok(())
        })
    }

    /// Hand every outcome token the market holds to the owner and close it
    pub fn close<L: OutcomeLedger>(&mut self, ledger: &mut L, caller: &Pubkey) -> ProgramResult {
        self.atomically(ledger, |maker, ledger| {
            maker.market.require_stage(Stage::Funded)?;
            maker.market.require_owner(caller)?;

            let market = &maker.market;
            for index in 0..market.outcome_count() {
                let asset = Asset::Outcome { set: market.outcome_set, index };
                let balance = ledger.balance_of(asset, &market.address);
                ledger.transfer(asset, &market.address, &market.owner, balance)?;
            }

            maker.market.stage = Stage::Closed;
            maker.record(MarketEvent::Closing(MarketClosing {}));
            msg!("Market closed");
            Ok(())
        })
    }

    /// Send the market's whole collateral balance to the owner.
    ///
    /// Between trades the market only ever holds fee residue, so the balance
    /// is exactly the fees charged and not yet withdrawn.
    pub fn withdraw_fees<L: OutcomeLedger>(&mut self, ledger: &mut L, caller: &Pubkey) -> Result<u64, ProgramError> {
        self.atomically(ledger, |maker, ledger| {
            maker.market.require_owner(caller)?;

            let market = &maker.market;
            let fees = ledger.balance_of(Asset::Collateral, &market.address);
            ledger.transfer(Asset::Collateral, &market.address, &market.owner, fees)?;

            maker.record(MarketEvent::FeeWithdrawal(FeeWithdrawal { fees }));
            msg!("Withdrew {} in fees", fees);
            Ok(fees)
        })
    }

    /// Fee charged on a trade whose raw cost has magnitude `outcome_token_cost`
    pub fn calc_market_fee(&self, outcome_token_cost: u64) -> u64 {
        self.market.calc_market_fee(outcome_token_cost)
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn cost_function(&self) -> &C {
        &self.cost_function
    }

    pub fn stage(&self) -> Stage {
        self.market.stage
    }

    pub fn fee(&self) -> u64 {
        self.market.fee
    }

    pub fn funding(&self) -> u64 {
        self.market.funding
    }

    pub fn net_outcome_tokens_sold(&self) -> &[i64] {
        &self.market.net_outcome_tokens_sold
    }

    pub fn outcome_count(&self) -> u8 {
        self.market.outcome_count()
    }

    pub fn owner(&self) -> &Pubkey {
        &self.market.owner
    }

    pub fn address(&self) -> &Pubkey {
        &self.market.address
    }

    /// Records emitted so far, oldest first
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub(crate) fn record(&mut self, event: MarketEvent) {
        self.events.push(event);
    }

    /// Run `operation` as one transaction.
    ///
    /// On error the market, the journal and the ledger are restored to their
    /// state before the call. Records are only emitted once the operation
    /// has committed.
    pub(crate) fn atomically<L, T, F>(&mut self, ledger: &mut L, operation: F) -> Result<T, ProgramError>
    where
        L: OutcomeLedger,
        F: FnOnce(&mut Self, &mut L) -> Result<T, ProgramError>,
    {
        let market = self.market.clone();
        let journal_len = self.events.len();
        let checkpoint = ledger.checkpoint();

        match operation(self, ledger) {
            Ok(value) => {
                for event in &self.events[journal_len..] {
                    event.emit();
                }
                Ok(value)
            }
            Err(err) => {
                self.market = market;
                self.events.truncate(journal_len);
                ledger.rollback(checkpoint);
                msg!("Operation aborted: {}", err);
                Err(err)
            }
        }
    }
}
