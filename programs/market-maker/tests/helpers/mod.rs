#![allow(dead_code)]

use outcome_market_maker::{
    constants::{FEE_RANGE, UNLIMITED_ALLOWANCE},
    Asset, CostFunction, InMemoryLedger, Market, MarketMaker, OutcomeLedger, OutcomeSetId,
};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

pub const TWO_PERCENT: u64 = FEE_RANGE / 50;
pub const STARTING_COLLATERAL: u64 = 1_000_000;

pub struct Accounts {
    pub owner: Pubkey,
    pub trader: Pubkey,
    pub market: Pubkey,
    pub set: OutcomeSetId,
}

impl Accounts {
    pub fn outcome(&self, index: u8) -> Asset {
        Asset::Outcome { set: self.set, index }
    }
}

/// Ledger with one registered outcome set and a funded, fully approving
/// owner and trader
pub fn setup(outcome_count: u8) -> (InMemoryLedger, Accounts) {
    let mut ledger = InMemoryLedger::new(Pubkey::new_unique());
    let accounts = Accounts {
        owner: Pubkey::new_unique(),
        trader: Pubkey::new_unique(),
        market: Pubkey::new_unique(),
        set: OutcomeSetId::new([3; 32]),
    };
    ledger.register_outcome_set(accounts.set, outcome_count);

    for holder in [accounts.owner, accounts.trader] {
        ledger.deposit(&holder, STARTING_COLLATERAL).unwrap();
        ledger
            .approve(Asset::Collateral, &holder, &accounts.market, UNLIMITED_ALLOWANCE)
            .unwrap();
        for index in 0..outcome_count {
            ledger
                .approve(accounts.outcome(index), &holder, &accounts.market, UNLIMITED_ALLOWANCE)
                .unwrap();
        }
    }
    (ledger, accounts)
}

pub fn create<C: CostFunction>(
    ledger: &mut InMemoryLedger,
    accounts: &Accounts,
    cost_function: C,
    fee: u64,
) -> MarketMaker<C> {
    let event_manager = ledger.id();
    MarketMaker::new(
        ledger,
        cost_function,
        accounts.market,
        accounts.owner,
        event_manager,
        accounts.set,
        fee,
    )
    .unwrap()
}

pub fn create_funded<C: CostFunction>(
    ledger: &mut InMemoryLedger,
    accounts: &Accounts,
    cost_function: C,
    fee: u64,
    funding: u64,
) -> MarketMaker<C> {
    let mut maker = create(ledger, accounts, cost_function, fee);
    maker.fund(ledger, &accounts.owner, funding).unwrap();
    maker
}

/// Cost function quoting fixed prices for known amount vectors
pub fn scripted(
    quotes: Vec<(Vec<i64>, i64)>,
) -> impl Fn(&Market, &[i64]) -> Result<i64, ProgramError> {
    move |_market: &Market, amounts: &[i64]| -> Result<i64, ProgramError> {
        if amounts.iter().all(|&amount| amount == 0) {
            return Ok(0);
        }
        quotes
            .iter()
            .find(|(quoted, _)| quoted.as_slice() == amounts)
            .map(|(_, cost)| *cost)
            .ok_or(ProgramError::InvalidArgument)
    }
}

/// Every collateral balance the tests can touch, custodian included
pub fn collateral_total(ledger: &InMemoryLedger, accounts: &Accounts) -> u64 {
    [accounts.owner, accounts.trader, accounts.market, ledger.id()]
        .iter()
        .map(|holder| ledger.balance_of(Asset::Collateral, holder))
        .sum()
}
