mod helpers;

use helpers::*;
use outcome_market_maker::{
    events::{MarketEvent, OutcomeTokenTrade},
    instruction::{self, MarketMakerInstruction},
    processor::Processor,
    Asset, Lmsr, MarketMakerError, OutcomeLedger, Stage,
};
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

#[test]
fn test_buy_then_sell_back_worked_example() {
    let (mut ledger, accounts) = setup(2);
    let cost_function = scripted(vec![(vec![100, 0], 60), (vec![-50, 0], -28)]);
    let mut maker = create_funded(&mut ledger, &accounts, cost_function, TWO_PERCENT, 1_000);

    // 2% of 60 rounds down to 1
    let net_cost = maker
        .trade(&mut ledger, &accounts.trader, &[100, 0], 0)
        .unwrap();
    assert_eq!(net_cost, 61);
    assert_eq!(maker.net_outcome_tokens_sold(), &[100, 0]);
    assert_eq!(ledger.balance_of(Asset::Collateral, &accounts.market), 1);
    assert_eq!(
        ledger.balance_of(Asset::Collateral, &accounts.trader),
        STARTING_COLLATERAL - 61
    );
    assert_eq!(ledger.balance_of(accounts.outcome(0), &accounts.trader), 100);
    assert_eq!(ledger.balance_of(accounts.outcome(0), &accounts.market), 960);
    assert_eq!(ledger.balance_of(accounts.outcome(1), &accounts.market), 1_060);

    // 2% of 28 rounds down to 0
    let net_cost = maker
        .trade(&mut ledger, &accounts.trader, &[-50, 0], 0)
        .unwrap();
    assert_eq!(net_cost, -28);
    assert_eq!(maker.net_outcome_tokens_sold(), &[50, 0]);
    assert_eq!(
        ledger.balance_of(Asset::Collateral, &accounts.trader),
        STARTING_COLLATERAL - 61 + 28
    );
    assert_eq!(ledger.balance_of(accounts.outcome(0), &accounts.trader), 50);
    assert_eq!(ledger.balance_of(accounts.outcome(0), &accounts.market), 982);
    assert_eq!(ledger.balance_of(accounts.outcome(1), &accounts.market), 1_032);
    assert_eq!(ledger.balance_of(Asset::Collateral, &accounts.market), 1);

    assert_eq!(
        &maker.events()[1..],
        &[
            MarketEvent::Trade(OutcomeTokenTrade {
                transactor: accounts.trader,
                outcome_token_amounts: vec![100, 0],
                outcome_token_net_cost: 60,
                market_fees: 1,
            }),
            MarketEvent::Trade(OutcomeTokenTrade {
                transactor: accounts.trader,
                outcome_token_amounts: vec![-50, 0],
                outcome_token_net_cost: -28,
                market_fees: 0,
            }),
        ]
    );
}

#[test]
fn test_zero_trade_is_a_no_op() {
    let (mut ledger, accounts) = setup(3);
    let mut maker = create_funded(&mut ledger, &accounts, Lmsr, TWO_PERCENT, 1_000);
    let trader_before = ledger.balance_of(Asset::Collateral, &accounts.trader);

    assert_eq!(maker.trade(&mut ledger, &accounts.trader, &[0, 0, 0], 0), Ok(0));
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 0, 0]);
    assert_eq!(ledger.balance_of(Asset::Collateral, &accounts.trader), trader_before);
    assert_eq!(ledger.balance_of(Asset::Collateral, &accounts.market), 0);
    for index in 0..3 {
        assert_eq!(ledger.balance_of(accounts.outcome(index), &accounts.market), 1_000);
    }
    assert_eq!(
        maker.events().last(),
        Some(&MarketEvent::Trade(OutcomeTokenTrade {
            transactor: accounts.trader,
            outcome_token_amounts: vec![0, 0, 0],
            outcome_token_net_cost: 0,
            market_fees: 0,
        }))
    );
}

#[test]
fn test_amounts_must_match_outcome_count() {
    let (mut ledger, accounts) = setup(3);
    let mut maker = create_funded(&mut ledger, &accounts, Lmsr, 0, 1_000);

    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[10, 0], 0),
        Err(MarketMakerError::AmountsLengthMismatch.into())
    );
    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[10, 0, 0, 0], 0),
        Err(MarketMakerError::AmountsLengthMismatch.into())
    );
}

#[test]
fn test_slippage_limit_is_an_upper_bound_on_net_cost() {
    let (mut ledger, accounts) = setup(2);
    let cost_function = scripted(vec![(vec![100, 0], 60), (vec![-50, 0], -28)]);
    let mut maker = create_funded(&mut ledger, &accounts, cost_function, TWO_PERCENT, 1_000);
    let snapshot = ledger.clone();

    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[100, 0], 60),
        Err(MarketMakerError::SlippageExceeded.into())
    );
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 0]);
    assert_eq!(
        ledger.balance_of(Asset::Collateral, &accounts.trader),
        snapshot.balance_of(Asset::Collateral, &accounts.trader)
    );
    assert_eq!(maker.events().len(), 1);

    assert_eq!(maker.trade(&mut ledger, &accounts.trader, &[100, 0], 61), Ok(61));

    // A seller demanding at least 29 back sets the limit to -29
    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[-50, 0], -29),
        Err(MarketMakerError::SlippageExceeded.into())
    );
    assert_eq!(maker.trade(&mut ledger, &accounts.trader, &[-50, 0], -28), Ok(-28));
}

#[test]
fn test_zero_limit_never_fails_on_slippage() {
    let (mut ledger, accounts) = setup(2);
    let cost_function = scripted(vec![(vec![100, 0], 900_000)]);
    let mut maker = create_funded(&mut ledger, &accounts, cost_function, TWO_PERCENT, 1_000);

    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[100, 0], 0),
        Ok(918_000)
    );
}

#[test]
fn test_custody_failure_mid_trade_rolls_everything_back() {
    let (mut ledger, accounts) = setup(2);
    let mut maker = create_funded(&mut ledger, &accounts, Lmsr, TWO_PERCENT, 1_000);
    let snapshot = ledger.clone();
    let events_before = maker.events().to_vec();

    // Collateral is pulled, sets minted and outcome 0 pushed before the
    // outcome 1 pull fails for lack of tokens
    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[300, -5], 0),
        Err(MarketMakerError::InsufficientBalance.into())
    );

    assert_eq!(maker.stage(), Stage::Funded);
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 0]);
    assert_eq!(maker.events(), events_before.as_slice());
    for holder in [accounts.trader, accounts.market, accounts.owner, ledger.id()] {
        assert_eq!(
            ledger.balance_of(Asset::Collateral, &holder),
            snapshot.balance_of(Asset::Collateral, &holder)
        );
        for index in 0..2 {
            assert_eq!(
                ledger.balance_of(accounts.outcome(index), &holder),
                snapshot.balance_of(accounts.outcome(index), &holder)
            );
        }
    }
}

#[test]
fn test_cost_function_failure_aborts_trade() {
    let (mut ledger, accounts) = setup(2);
    let cost_function = scripted(vec![]);
    let mut maker = create_funded(&mut ledger, &accounts, cost_function, 0, 1_000);

    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[1, 0], 0),
        Err(ProgramError::InvalidArgument)
    );
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 0]);
}

#[test]
fn test_net_cost_overflow_is_rejected() {
    let (mut ledger, accounts) = setup(2);
    let cost_function = scripted(vec![(vec![1, 0], i64::MAX)]);
    let mut maker = create_funded(&mut ledger, &accounts, cost_function, TWO_PERCENT, 1_000);

    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[1, 0], 0),
        Err(MarketMakerError::ArithmeticOverflow.into())
    );
}

#[test]
fn test_exposure_overflow_is_rejected_before_custody() {
    let (mut ledger, accounts) = setup(2);
    let cost_function = scripted(vec![(vec![i64::MAX, 0], 0), (vec![1, 0], 0)]);
    let mut maker = create_funded(&mut ledger, &accounts, cost_function, 0, 1_000);

    // Zero-cost quotes push the market's own tokens straight out
    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[i64::MAX, 0], 0),
        Err(MarketMakerError::InsufficientBalance.into())
    );
    maker.trade(&mut ledger, &accounts.trader, &[1, 0], 0).unwrap();
    let snapshot = ledger.clone();

    assert_eq!(
        maker.trade(&mut ledger, &accounts.trader, &[i64::MAX, 0], 0),
        Err(MarketMakerError::ArithmeticOverflow.into())
    );
    assert_eq!(maker.net_outcome_tokens_sold(), &[1, 0]);
    assert_eq!(
        ledger.balance_of(accounts.outcome(0), &accounts.market),
        snapshot.balance_of(accounts.outcome(0), &accounts.market)
    );
}

#[test]
fn test_lmsr_buy_and_sell_helpers() {
    let (mut ledger, accounts) = setup(2);
    let mut maker = create_funded(&mut ledger, &accounts, Lmsr, TWO_PERCENT, 1_000);

    assert_eq!(
        maker.buy(&mut ledger, &accounts.trader, 0, 100, 51),
        Err(MarketMakerError::SlippageExceeded.into())
    );
    // raw cost 51, fee 1
    assert_eq!(maker.buy(&mut ledger, &accounts.trader, 0, 100, 52), Ok(52));
    assert_eq!(maker.net_outcome_tokens_sold(), &[100, 0]);

    assert_eq!(
        maker.sell(&mut ledger, &accounts.trader, 0, 100, 50),
        Err(MarketMakerError::SlippageExceeded.into())
    );
    // raw proceeds 50, fee 1
    assert_eq!(maker.sell(&mut ledger, &accounts.trader, 0, 100, 49), Ok(49));
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 0]);

    assert_eq!(ledger.balance_of(accounts.outcome(0), &accounts.trader), 0);
    assert_eq!(
        ledger.balance_of(Asset::Collateral, &accounts.trader),
        STARTING_COLLATERAL - 3
    );
    assert_eq!(ledger.balance_of(Asset::Collateral, &accounts.market), 2);
    assert_eq!(maker.withdraw_fees(&mut ledger, &accounts.owner), Ok(2));

    assert_eq!(
        maker.buy(&mut ledger, &accounts.trader, 2, 1, 0),
        Err(MarketMakerError::InvalidOutcomeIndex.into())
    );
    assert_eq!(
        maker.sell(&mut ledger, &accounts.trader, 0, u64::MAX, 0),
        Err(MarketMakerError::ArithmeticOverflow.into())
    );
}

#[test]
fn test_deep_market_still_charges_for_small_buys() {
    const FUNDING: u64 = 1_000_000_000_000_000_000;

    let (mut ledger, accounts) = setup(2);
    ledger.deposit(&accounts.owner, FUNDING).unwrap();
    let mut maker = create_funded(&mut ledger, &accounts, Lmsr, 0, FUNDING);

    let net_cost = maker
        .trade(&mut ledger, &accounts.trader, &[50, 0], 0)
        .unwrap();
    assert!(net_cost >= 26, "50 tokens at ~50% quoted {}", net_cost);
    assert_eq!(
        ledger.balance_of(Asset::Collateral, &accounts.trader),
        STARTING_COLLATERAL - net_cost as u64
    );
    assert_eq!(ledger.balance_of(accounts.outcome(0), &accounts.trader), 50);

    let paid = maker.buy(&mut ledger, &accounts.trader, 1, 1, 0).unwrap();
    assert!(paid >= 1);

    let received = maker.sell(&mut ledger, &accounts.trader, 0, 50, 0).unwrap();
    assert!(received <= net_cost as u64);
}

#[test]
fn test_buy_conserves_collateral() {
    let (mut ledger, accounts) = setup(3);
    let mut maker = create_funded(&mut ledger, &accounts, Lmsr, TWO_PERCENT, 10_000);
    let total = collateral_total(&ledger, &accounts);
    let locked_before = ledger.locked_collateral();

    let net_cost = maker
        .trade(&mut ledger, &accounts.trader, &[500, 200, 0], 0)
        .unwrap();
    let Some(MarketEvent::Trade(record)) = maker.events().last() else {
        panic!("trade was not recorded");
    };

    assert_eq!(Some(net_cost), record.net_cost());
    assert_eq!(
        ledger.balance_of(Asset::Collateral, &accounts.market),
        record.market_fees
    );
    assert_eq!(
        ledger.locked_collateral(),
        locked_before + record.outcome_token_net_cost as u64
    );
    assert_eq!(collateral_total(&ledger, &accounts), total);
}

#[test]
fn test_processor_dispatches_instructions() {
    let (mut ledger, accounts) = setup(2);
    let mut maker = create(&mut ledger, &accounts, Lmsr, TWO_PERCENT);
    let program_id = outcome_market_maker::id();

    let fund = instruction::fund(&program_id, &accounts.owner, &accounts.market, 1_000).unwrap();
    Processor::process_instruction(&mut maker, &mut ledger, &fund).unwrap();
    assert_eq!(maker.stage(), Stage::Funded);

    let buy = instruction::buy(&program_id, &accounts.trader, &accounts.market, 1, 100, 0).unwrap();
    Processor::process_instruction(&mut maker, &mut ledger, &buy).unwrap();
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 100]);

    let trade = instruction::trade(
        &program_id,
        &accounts.trader,
        &accounts.market,
        vec![0, -40],
        0,
    )
    .unwrap();
    Processor::process_instruction(&mut maker, &mut ledger, &trade).unwrap();
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 60]);

    let sell = instruction::sell(&program_id, &accounts.trader, &accounts.market, 1, 60, 0).unwrap();
    Processor::process(&mut maker, &mut ledger, &accounts.trader, &sell.data).unwrap();
    assert_eq!(maker.net_outcome_tokens_sold(), &[0, 0]);

    let close = instruction::close(&program_id, &accounts.trader, &accounts.market).unwrap();
    assert_eq!(
        Processor::process_instruction(&mut maker, &mut ledger, &close),
        Err(MarketMakerError::Unauthorized.into())
    );
    let close = instruction::close(&program_id, &accounts.owner, &accounts.market).unwrap();
    Processor::process_instruction(&mut maker, &mut ledger, &close).unwrap();
    assert_eq!(maker.stage(), Stage::Closed);

    let withdraw = instruction::withdraw_fees(&program_id, &accounts.owner, &accounts.market).unwrap();
    Processor::process_instruction(&mut maker, &mut ledger, &withdraw).unwrap();
    assert_eq!(ledger.balance_of(Asset::Collateral, &accounts.market), 0);

    assert_eq!(
        Processor::process(&mut maker, &mut ledger, &accounts.owner, &[9, 9, 9]),
        Err(MarketMakerError::InvalidInstruction.into())
    );
    assert_eq!(
        MarketMakerInstruction::unpack(&withdraw.data).unwrap(),
        MarketMakerInstruction::WithdrawFees
    );
}

#[test]
fn test_processor_checks_instruction_accounts() {
    let (mut ledger, accounts) = setup(2);
    let mut maker = create(&mut ledger, &accounts, Lmsr, TWO_PERCENT);
    let program_id = outcome_market_maker::id();

    let foreign = instruction::fund(&Pubkey::new_unique(), &accounts.owner, &accounts.market, 1_000).unwrap();
    assert_eq!(
        Processor::process_instruction(&mut maker, &mut ledger, &foreign),
        Err(ProgramError::IncorrectProgramId)
    );

    let other_market = instruction::fund(&program_id, &accounts.owner, &Pubkey::new_unique(), 1_000).unwrap();
    assert_eq!(
        Processor::process_instruction(&mut maker, &mut ledger, &other_market),
        Err(ProgramError::InvalidAccountData)
    );

    let mut unsigned = instruction::fund(&program_id, &accounts.owner, &accounts.market, 1_000).unwrap();
    unsigned.accounts[0].is_signer = false;
    assert_eq!(
        Processor::process_instruction(&mut maker, &mut ledger, &unsigned),
        Err(ProgramError::MissingRequiredSignature)
    );

    let mut readonly = instruction::fund(&program_id, &accounts.owner, &accounts.market, 1_000).unwrap();
    readonly.accounts[1].is_writable = false;
    assert_eq!(
        Processor::process_instruction(&mut maker, &mut ledger, &readonly),
        Err(ProgramError::InvalidAccountData)
    );

    let mut truncated = instruction::fund(&program_id, &accounts.owner, &accounts.market, 1_000).unwrap();
    truncated.accounts.truncate(1);
    assert_eq!(
        Processor::process_instruction(&mut maker, &mut ledger, &truncated),
        Err(ProgramError::NotEnoughAccountKeys)
    );

    assert_eq!(maker.stage(), Stage::Created);
    assert_eq!(ledger.balance_of(Asset::Collateral, &accounts.owner), STARTING_COLLATERAL);
}
