#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tradeledger::adapters::clock_adapter::FixedClock;
use tradeledger::domain::account::{Account, AccountOptions};
use tradeledger::domain::error::LedgerError;
use tradeledger::domain::symbol::Symbol;
use tradeledger::ports::price_port::PricePort;

/// In-memory oracle with scripted failures. The outage switch fails every
/// lookup while set, so a test can break the oracle after trades are in.
pub struct MockPricePort {
    pub prices: HashMap<String, Decimal>,
    pub failing: HashSet<String>,
    pub outage: Rc<Cell<bool>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            failing: HashSet::new(),
            outage: Rc::new(Cell::new(false)),
        }
    }

    pub fn outage_switch(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.outage)
    }

    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn price(&self, symbol: &Symbol) -> Result<Decimal, LedgerError> {
        if self.outage.get() || self.failing.contains(symbol.as_str()) {
            return Err(LedgerError::PriceUnavailable {
                symbol: symbol.to_string(),
                reason: "feed offline".into(),
            });
        }
        self.prices
            .get(symbol.as_str())
            .copied()
            .ok_or_else(|| LedgerError::PriceUnavailable {
                symbol: symbol.to_string(),
                reason: "unknown symbol".into(),
            })
    }
}

/// 2025-01-01 at `hour`:00 UTC.
pub fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
}

/// AAPL 180.00, TSLA 250.00.
pub fn standard_prices() -> MockPricePort {
    MockPricePort::new()
        .with_price("AAPL", Decimal::new(18000, 2))
        .with_price("TSLA", Decimal::new(25000, 2))
}

pub fn make_account(prices: MockPricePort) -> Account {
    Account::open(
        "u1",
        AccountOptions {
            account_id: Some("acct-test".into()),
            created_at: None,
        },
        Box::new(prices),
        Box::new(FixedClock::new(ts(23))),
    )
    .unwrap()
}
