//! Emitted market records
//!
//! Every record is logged as three lines: a marker, the event type and the
//! bs58-encoded borsh payload. Hosts index them from the program log.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

pub const EVENT_MARKER: &str = "MARKET_MAKER_EVENT";

/// Event type discriminator
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    MarketFunding = 1,
    MarketClosing = 2,
    FeeWithdrawal = 3,
    OutcomeTokenTrade = 4,
}

pub trait Event: BorshSerialize {
    fn event_type() -> EventType;

    fn emit(&self) {
        msg!("{}", EVENT_MARKER);
        msg!("TYPE:{:?}", Self::event_type());

        if let Ok(data) = self.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketFunding {
    pub funding: u64,
}

impl Event for MarketFunding {
    fn event_type() -> EventType {
        EventType::MarketFunding
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketClosing {}

impl Event for MarketClosing {
    fn event_type() -> EventType {
        EventType::MarketClosing
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeeWithdrawal {
    pub fees: u64,
}

impl Event for FeeWithdrawal {
    fn event_type() -> EventType {
        EventType::FeeWithdrawal
    }
}

/// Auditable record of one settled trade
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutcomeTokenTrade {
    pub transactor: Pubkey,
    pub outcome_token_amounts: Vec<i64>,
    /// Raw cost from the cost function, before fees
    pub outcome_token_net_cost: i64,
    pub market_fees: u64,
}

impl OutcomeTokenTrade {
    /// Signed collateral exchanged: raw cost plus fee
    pub fn net_cost(&self) -> Option<i64> {
        i64::try_from(self.market_fees)
            .ok()
            .and_then(|fee| self.outcome_token_net_cost.checked_add(fee))
    }
}

impl Event for OutcomeTokenTrade {
    fn event_type() -> EventType {
        EventType::OutcomeTokenTrade
    }
}

/// Journal entry kept by the market maker, one per emitted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    Funding(MarketFunding),
    Closing(MarketClosing),
    FeeWithdrawal(FeeWithdrawal),
    Trade(OutcomeTokenTrade),
}

impl MarketEvent {
    pub fn emit(&self) {
        match self {
            MarketEvent::Funding(event) => event.emit(),
            MarketEvent::Closing(event) => event.emit(),
            MarketEvent::FeeWithdrawal(event) => event.emit(),
            MarketEvent::Trade(event) => event.emit(),
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            MarketEvent::Funding(_) => MarketFunding::event_type(),
            MarketEvent::Closing(_) => MarketClosing::event_type(),
            MarketEvent::FeeWithdrawal(_) => FeeWithdrawal::event_type(),
            MarketEvent::Trade(_) => OutcomeTokenTrade::event_type(),
        }
    }
}
