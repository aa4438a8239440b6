//! Immutable ledger events.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::LedgerError;
use super::money::{checked_mul, Money, Quantity};
use super::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Buy,
    Sell,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdraw => "WITHDRAW",
            TransactionKind::Buy => "BUY",
            TransactionKind::Sell => "SELL",
        }
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAW" => Ok(TransactionKind::Withdraw),
            "BUY" => Ok(TransactionKind::Buy),
            "SELL" => Ok(TransactionKind::Sell),
            _ => Err(LedgerError::UnknownKind { tag: s.to_string() }),
        }
    }
}

/// One recorded fact. Only the account's commands construct these, and the
/// ledger hands out shared references only.
///
/// `amount` is the cash moved: the deposit/withdrawal itself, or the
/// normalized cost/proceeds of a trade. `symbol`, `quantity` and `price` are
/// present exactly for trades.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub(crate) id: Uuid,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) kind: TransactionKind,
    pub(crate) amount: Money,
    pub(crate) symbol: Option<Symbol>,
    pub(crate) quantity: Option<Quantity>,
    pub(crate) price: Option<Money>,
    pub(crate) note: Option<String>,
}

impl Transaction {
    pub(crate) fn cash(
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
        amount: Money,
        note: Option<String>,
    ) -> Self {
        Transaction {
            id: Uuid::new_v4(),
            timestamp,
            kind,
            amount,
            symbol: None,
            quantity: None,
            price: None,
            note,
        }
    }

    pub(crate) fn trade(
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
        symbol: Symbol,
        quantity: Quantity,
        price: Money,
        note: Option<String>,
    ) -> Result<Self, LedgerError> {
        let amount = Money::new(checked_mul(price.value(), quantity.value())?);
        Ok(Transaction {
            id: Uuid::new_v4(),
            timestamp,
            kind,
            amount,
            symbol: Some(symbol),
            quantity: Some(quantity),
            price: Some(price),
            note,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn quantity(&self) -> Option<Quantity> {
        self.quantity
    }

    pub fn price(&self) -> Option<Money> {
        self.price
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}
