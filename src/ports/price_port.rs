//! Price oracle port.

use rust_decimal::Decimal;

use crate::domain::error::LedgerError;
use crate::domain::money::Money;
use crate::domain::symbol::Symbol;

pub trait PricePort {
    /// Current price for `symbol`. Unknown symbols fail with
    /// [`LedgerError::PriceUnavailable`].
    fn price(&self, symbol: &Symbol) -> Result<Decimal, LedgerError>;
}

/// Oracle price normalized to money. A non-positive price, or one that
/// rounds to zero, counts as unavailable.
pub fn quote(prices: &dyn PricePort, symbol: &Symbol) -> Result<Money, LedgerError> {
    let raw = prices.price(symbol)?;
    let unavailable = |reason: String| LedgerError::PriceUnavailable {
        symbol: symbol.to_string(),
        reason,
    };
    if raw <= Decimal::ZERO {
        return Err(unavailable(format!("non-positive price {raw}")));
    }
    let price = Money::new(raw);
    if price.is_zero() {
        return Err(unavailable(format!("price {raw} rounds to zero")));
    }
    Ok(price)
}
