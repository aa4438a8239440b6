//! Ticker symbols.

use std::borrow::Borrow;
use std::fmt;

use super::error::LedgerError;

/// A normalized ticker: trimmed, uppercase, `[A-Z][A-Z0-9.]*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let sym = raw.trim().to_uppercase();
        let mut chars = sym.chars();
        match chars.next() {
            None => {
                return Err(LedgerError::InvalidSymbol {
                    symbol: raw.to_string(),
                    reason: "symbol cannot be empty".into(),
                });
            }
            Some(first) if !first.is_ascii_uppercase() => {
                return Err(LedgerError::InvalidSymbol {
                    symbol: sym,
                    reason: "must start with a letter".into(),
                });
            }
            Some(_) => {}
        }
        if let Some(bad) = chars.find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '.')) {
            return Err(LedgerError::InvalidSymbol {
                reason: format!("unexpected character {bad:?}"),
                symbol: sym,
            });
        }
        Ok(Symbol(sym))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
