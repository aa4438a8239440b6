//! Fixed-precision money, quantity and percent values.
//!
//! Every monetary value is held at 2 decimal places, every share quantity at
//! 8, every percentage at 2. All rounding is half-up (midpoint away from
//! zero). The `normalize_*` functions are the only rounding entry points and
//! are shared by every command and query.

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

use super::error::LedgerError;

pub const MONEY_DP: u32 = 2;
pub const QUANTITY_DP: u32 = 8;
pub const PERCENT_DP: u32 = 2;

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

pub fn normalize_money(value: Decimal) -> Decimal {
    round_half_up(value, MONEY_DP)
}

pub fn normalize_quantity(value: Decimal) -> Decimal {
    round_half_up(value, QUANTITY_DP)
}

pub fn normalize_percent(value: Decimal) -> Decimal {
    round_half_up(value, PERCENT_DP)
}

// Checked arithmetic. Past the 96-bit decimal range the result is
// `OutOfRange`, never a panic.

pub fn checked_add(lhs: Decimal, rhs: Decimal) -> Result<Decimal, LedgerError> {
    lhs.checked_add(rhs)
        .ok_or(LedgerError::OutOfRange { operation: "addition" })
}

pub fn checked_sub(lhs: Decimal, rhs: Decimal) -> Result<Decimal, LedgerError> {
    lhs.checked_sub(rhs)
        .ok_or(LedgerError::OutOfRange { operation: "subtraction" })
}

pub fn checked_mul(lhs: Decimal, rhs: Decimal) -> Result<Decimal, LedgerError> {
    lhs.checked_mul(rhs)
        .ok_or(LedgerError::OutOfRange { operation: "multiplication" })
}

/// Also `OutOfRange` for a zero divisor; callers rule that out first.
pub fn checked_div(lhs: Decimal, rhs: Decimal) -> Result<Decimal, LedgerError> {
    lhs.checked_div(rhs)
        .ok_or(LedgerError::OutOfRange { operation: "division" })
}

/// Raw numeric input accepted by the commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Text(String),
    Decimal(Decimal),
    Float(f64),
    Int(i64),
}

impl Numeric {
    /// Parse into an exact decimal. Floats go through their shortest
    /// display form so `10.005_f64` becomes `10.005`, not its binary
    /// expansion.
    pub fn to_decimal(&self) -> Result<Decimal, LedgerError> {
        match self {
            Numeric::Decimal(d) => Ok(*d),
            Numeric::Int(i) => Ok(Decimal::from(*i)),
            Numeric::Float(f) => {
                if !f.is_finite() {
                    return Err(LedgerError::NotANumber {
                        input: f.to_string(),
                    });
                }
                parse_decimal(&f.to_string())
            }
            Numeric::Text(s) => parse_decimal(s),
        }
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, LedgerError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| LedgerError::NotANumber {
            input: raw.to_string(),
        })
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Numeric::Text(value.to_string())
    }
}

impl From<String> for Numeric {
    fn from(value: String) -> Self {
        Numeric::Text(value)
    }
}

impl From<Decimal> for Numeric {
    fn from(value: Decimal) -> Self {
        Numeric::Decimal(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Float(value)
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Int(value)
    }
}

impl From<i32> for Numeric {
    fn from(value: i32) -> Self {
        Numeric::Int(i64::from(value))
    }
}

/// A monetary amount at 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Money(normalize_money(value))
    }

    /// Parse and normalize, then require the result to be strictly positive.
    pub fn positive(field: &'static str, input: &Numeric) -> Result<Self, LedgerError> {
        let money = Money::new(input.to_decimal()?);
        if money.0 <= Decimal::ZERO {
            return Err(LedgerError::NonPositive {
                field,
                value: money.0,
            });
        }
        Ok(money)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Money {
    pub fn checked_add(self, rhs: Money) -> Result<Money, LedgerError> {
        Ok(Money::new(checked_add(self.0, rhs.0)?))
    }

    pub fn checked_sub(self, rhs: Money) -> Result<Money, LedgerError> {
        Ok(Money::new(checked_sub(self.0, rhs.0)?))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A share quantity at 8 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(Decimal);

impl Quantity {
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Quantity(normalize_quantity(value))
    }

    pub fn positive(field: &'static str, input: &Numeric) -> Result<Self, LedgerError> {
        let qty = Quantity::new(input.to_decimal()?);
        if qty.0 <= Decimal::ZERO {
            return Err(LedgerError::NonPositive { field, value: qty.0 });
        }
        Ok(qty)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Display form with trailing zeros trimmed (`1.5`, `2`).
    pub fn trimmed(&self) -> String {
        self.0.normalize().to_string()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A percentage at 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(Decimal);

impl Percent {
    pub fn new(value: Decimal) -> Self {
        Percent(normalize_percent(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
