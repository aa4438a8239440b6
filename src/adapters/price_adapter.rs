//! Fixed price table implementing PricePort.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::domain::error::{AppError, LedgerError};
use crate::domain::symbol::Symbol;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;

pub const PRICES_SECTION: &str = "prices";

/// Deterministic symbol -> price lookup.
#[derive(Debug, Clone, Default)]
pub struct FixedPriceAdapter {
    prices: BTreeMap<Symbol, Decimal>,
}

impl FixedPriceAdapter {
    pub fn new<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, Decimal)>,
    {
        Self {
            prices: prices.into_iter().collect(),
        }
    }

    /// AAPL 180.00, TSLA 250.00, GOOGL 140.00.
    pub fn default_table() -> Self {
        let entries = [
            ("AAPL", Decimal::new(18000, 2)),
            ("TSLA", Decimal::new(25000, 2)),
            ("GOOGL", Decimal::new(14000, 2)),
        ];
        Self {
            prices: entries
                .into_iter()
                .filter_map(|(sym, px)| Symbol::parse(sym).ok().map(|s| (s, px)))
                .collect(),
        }
    }

    /// Build from the `[prices]` section, falling back to the default table
    /// when the section is absent.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AppError> {
        if !config.has_section(PRICES_SECTION) {
            return Ok(Self::default_table());
        }

        let mut prices = BTreeMap::new();
        for key in config.keys(PRICES_SECTION) {
            let invalid = |reason: String| AppError::ConfigInvalid {
                section: PRICES_SECTION.to_string(),
                key: key.clone(),
                reason,
            };
            let symbol = Symbol::parse(&key).map_err(|e| invalid(e.to_string()))?;
            let raw = config
                .get_string(PRICES_SECTION, &key)
                .ok_or_else(|| invalid("price is required".into()))?;
            let price = Decimal::from_str(&raw)
                .map_err(|_| invalid(format!("{raw:?} is not a number")))?;
            if price <= Decimal::ZERO {
                return Err(invalid("price must be positive".into()));
            }
            prices.insert(symbol, price);
        }
        Ok(Self { prices })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.prices.keys()
    }
}

impl PricePort for FixedPriceAdapter {
    fn price(&self, symbol: &Symbol) -> Result<Decimal, LedgerError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| LedgerError::PriceUnavailable {
                symbol: symbol.to_string(),
                reason: "unknown symbol".into(),
            })
    }
}
