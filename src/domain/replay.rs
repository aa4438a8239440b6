//! Replay engine: folds a ledger prefix into a point-in-time snapshot.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::error::LedgerError;
use super::money::{checked_add, checked_mul, checked_sub, Money, Quantity};
use super::symbol::Symbol;
use super::transaction::{Transaction, TransactionKind};

/// Cash and per-symbol holdings at one instant. Holdings may contain
/// zero-quantity symbols; callers that present holdings drop them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Replayed {
    pub cash: Money,
    pub holdings: BTreeMap<Symbol, Quantity>,
}

impl Replayed {
    pub fn held(&self, symbol: &Symbol) -> Quantity {
        self.holdings.get(symbol).copied().unwrap_or(Quantity::ZERO)
    }

    /// Holdings without zero-quantity entries.
    pub fn open_positions(&self) -> BTreeMap<Symbol, Quantity> {
        self.holdings
            .iter()
            .filter(|(_, qty)| !qty.is_zero())
            .map(|(sym, qty)| (sym.clone(), *qty))
            .collect()
    }
}

struct TradeTerms<'a> {
    symbol: &'a Symbol,
    quantity: Decimal,
    price: Decimal,
}

fn trade_terms(tx: &Transaction) -> Result<TradeTerms<'_>, LedgerError> {
    let corrupt = |missing: &'static str| {
        tracing::error!(id = %tx.id, kind = %tx.kind, missing, "corrupt transaction in ledger");
        LedgerError::CorruptTransaction {
            id: tx.id,
            kind: tx.kind,
            missing,
        }
    };
    let symbol = tx.symbol.as_ref().ok_or_else(|| corrupt("symbol"))?;
    let quantity = tx.quantity.ok_or_else(|| corrupt("quantity"))?;
    let price = tx.price.ok_or_else(|| corrupt("price"))?;
    Ok(TradeTerms {
        symbol,
        quantity: quantity.value(),
        price: price.value(),
    })
}

/// Fold `entries` in order. Cash and quantities accumulate at full precision
/// and are normalized once at the end; a running total that leaves the
/// decimal range is `OutOfRange`.
pub fn replay<'a, I>(entries: I) -> Result<Replayed, LedgerError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut cash = Decimal::ZERO;
    let mut positions: BTreeMap<Symbol, Decimal> = BTreeMap::new();

    for tx in entries {
        match tx.kind {
            TransactionKind::Deposit => cash = checked_add(cash, tx.amount.value())?,
            TransactionKind::Withdraw => cash = checked_sub(cash, tx.amount.value())?,
            TransactionKind::Buy => {
                let t = trade_terms(tx)?;
                cash = checked_sub(cash, checked_mul(t.price, t.quantity)?)?;
                let held = positions.entry(t.symbol.clone()).or_default();
                *held = checked_add(*held, t.quantity)?;
            }
            TransactionKind::Sell => {
                let t = trade_terms(tx)?;
                cash = checked_add(cash, checked_mul(t.price, t.quantity)?)?;
                let held = positions.entry(t.symbol.clone()).or_default();
                *held = checked_sub(*held, t.quantity)?;
            }
        }
    }

    Ok(Replayed {
        cash: Money::new(cash),
        holdings: positions
            .into_iter()
            .map(|(sym, qty)| (sym, Quantity::new(qty)))
            .collect(),
    })
}

/// Deposits minus withdrawals over `entries`.
pub fn net_contributions<'a, I>(entries: I) -> Result<Money, LedgerError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut total = Decimal::ZERO;
    for tx in entries {
        total = match tx.kind {
            TransactionKind::Deposit => checked_add(total, tx.amount.value())?,
            TransactionKind::Withdraw => checked_sub(total, tx.amount.value())?,
            TransactionKind::Buy | TransactionKind::Sell => total,
        };
    }
    Ok(Money::new(total))
}
