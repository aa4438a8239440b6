//! Account identity and point-in-time queries.
//!
//! The account owns its ledger exclusively. Mutations go through the
//! commands in [`super::commands`]; every query here is a pure function of
//! the stored log (plus the price oracle for valuations).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::error::LedgerError;
use super::ledger::LedgerStore;
use super::money::{checked_add, checked_div, checked_mul, Money, Percent, Quantity};
use super::replay::{self, Replayed};
use super::symbol::Symbol;
use super::timestamp::{normalize_timestamp, TimeInput};
use super::transaction::Transaction;
use crate::ports::clock_port::ClockPort;
use crate::ports::price_port::{self, PricePort};

/// Optional identity overrides for [`Account::open`].
#[derive(Debug, Clone, Default)]
pub struct AccountOptions {
    pub account_id: Option<String>,
    pub created_at: Option<TimeInput>,
}

/// Valuation summary at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub cash: Money,
    pub portfolio_value: Money,
    pub equity: Money,
    pub net_contributions: Money,
    pub profit_loss: Money,
    pub profit_loss_pct: Option<Percent>,
}

/// One held symbol valued at its current price.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValuation {
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Money,
    pub value: Money,
}

pub struct Account {
    account_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
    pub(crate) ledger: LedgerStore,
    pub(crate) prices: Box<dyn PricePort>,
    pub(crate) clock: Box<dyn ClockPort>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("account_id", &self.account_id)
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .field("transactions", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

impl Account {
    pub fn open(
        user_id: &str,
        options: AccountOptions,
        prices: Box<dyn PricePort>,
        clock: Box<dyn ClockPort>,
    ) -> Result<Self, LedgerError> {
        if user_id.trim().is_empty() {
            return Err(LedgerError::EmptyUserId);
        }
        let created_at = match &options.created_at {
            Some(input) => normalize_timestamp(input)?,
            None => clock.now(),
        };
        let account_id = options
            .account_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing::info!(%account_id, user_id, %created_at, "account opened");

        Ok(Account {
            account_id,
            user_id: user_id.to_string(),
            created_at,
            ledger: LedgerStore::new(),
            prices,
            clock,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Read-only view of the ledger.
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn transactions(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> &[Transaction] {
        self.ledger.range(start, end)
    }

    /// Current price of `symbol`, normalized to money.
    pub fn quote(&self, symbol: &Symbol) -> Result<Money, LedgerError> {
        price_port::quote(self.prices.as_ref(), symbol)
    }

    pub fn replay(&self, as_of: Option<DateTime<Utc>>) -> Result<Replayed, LedgerError> {
        replay::replay(self.ledger.up_to(as_of))
    }

    pub fn cash_balance(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        Ok(self.replay(as_of)?.cash)
    }

    pub fn holdings(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<Symbol, Quantity>, LedgerError> {
        Ok(self.replay(as_of)?.open_positions())
    }

    /// Held symbols in symbol order, each valued at its current price.
    pub fn holding_valuations(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<HoldingValuation>, LedgerError> {
        self.holdings(as_of)?
            .into_iter()
            .map(|(symbol, quantity)| {
                let price = self.quote(&symbol)?;
                Ok(HoldingValuation {
                    value: Money::new(checked_mul(price.value(), quantity.value())?),
                    symbol,
                    quantity,
                    price,
                })
            })
            .collect()
    }

    pub fn portfolio_value(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        self.value_positions(self.holdings(as_of)?)
    }

    pub fn equity_value(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        self.cash_balance(as_of)?
            .checked_add(self.portfolio_value(as_of)?)
    }

    pub fn net_contributions(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        replay::net_contributions(self.ledger.up_to(as_of))
    }

    pub fn profit_loss(&self, as_of: Option<DateTime<Utc>>) -> Result<Money, LedgerError> {
        self.equity_value(as_of)?
            .checked_sub(self.net_contributions(as_of)?)
    }

    /// `None` when net contributions are zero.
    pub fn profit_loss_pct(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Option<Percent>, LedgerError> {
        let contributions = self.net_contributions(as_of)?;
        let profit_loss = self.profit_loss(as_of)?;
        pct_of(profit_loss, contributions)
    }

    /// All valuation figures for one instant, replaying the log once.
    pub fn snapshot(&self, as_of: Option<DateTime<Utc>>) -> Result<Snapshot, LedgerError> {
        let state = self.replay(as_of)?;
        let portfolio_value = self.value_positions(state.open_positions())?;
        let equity = state.cash.checked_add(portfolio_value)?;
        let net_contributions = replay::net_contributions(self.ledger.up_to(as_of))?;
        let profit_loss = equity.checked_sub(net_contributions)?;
        Ok(Snapshot {
            cash: state.cash,
            portfolio_value,
            equity,
            net_contributions,
            profit_loss,
            profit_loss_pct: pct_of(profit_loss, net_contributions)?,
        })
    }

    /// Σ price * quantity at full precision, normalized once.
    fn value_positions(
        &self,
        positions: BTreeMap<Symbol, Quantity>,
    ) -> Result<Money, LedgerError> {
        let mut total = Decimal::ZERO;
        for (symbol, quantity) in positions {
            let value = checked_mul(self.quote(&symbol)?.value(), quantity.value())?;
            total = checked_add(total, value)?;
        }
        Ok(Money::new(total))
    }
}

fn pct_of(profit_loss: Money, contributions: Money) -> Result<Option<Percent>, LedgerError> {
    if contributions.is_zero() {
        return Ok(None);
    }
    let ratio = checked_div(profit_loss.value(), contributions.value())?;
    Ok(Some(Percent::new(checked_mul(ratio, Decimal::ONE_HUNDRED)?)))
}
