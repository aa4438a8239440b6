//! Domain error types.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::transaction::TransactionKind;

/// Which bucket of the error taxonomy a [`LedgerError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller-correctable input problem.
    Validation,
    /// Business rule rejected an otherwise well-formed command.
    Feasibility,
    /// The stored log itself is corrupt. Never expected in correct operation.
    Integrity,
}

/// Errors raised by the ledger core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("user id must be a non-empty string")]
    EmptyUserId,

    #[error("invalid numeric value: {input:?}")]
    NotANumber { input: String },

    #[error("{field} must be > 0, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("invalid symbol {symbol:?}: {reason}")]
    InvalidSymbol { symbol: String, reason: String },

    #[error("price unavailable for {symbol}: {reason}")]
    PriceUnavailable { symbol: String, reason: String },

    #[error("timestamp must be timezone-aware, got {input}")]
    NaiveTimestamp { input: String },

    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("insufficient cash: available {available}, required {required}")]
    InsufficientFunds { available: Decimal, required: Decimal },

    #[error("insufficient holdings of {symbol}: held {held}, requested {requested}")]
    InsufficientHoldings {
        symbol: String,
        held: Decimal,
        requested: Decimal,
    },

    #[error("corrupt {kind} transaction {id}: missing {missing}")]
    CorruptTransaction {
        id: Uuid,
        kind: TransactionKind,
        missing: &'static str,
    },

    #[error("unknown transaction kind: {tag:?}")]
    UnknownKind { tag: String },

    #[error("value out of range: {operation} overflowed")]
    OutOfRange { operation: &'static str },
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            LedgerError::EmptyUserId
            | LedgerError::NotANumber { .. }
            | LedgerError::NonPositive { .. }
            | LedgerError::InvalidSymbol { .. }
            | LedgerError::PriceUnavailable { .. }
            | LedgerError::NaiveTimestamp { .. }
            | LedgerError::InvalidTimestamp { .. }
            | LedgerError::OutOfRange { .. } => ErrorClass::Validation,
            LedgerError::InsufficientFunds { .. } | LedgerError::InsufficientHoldings { .. } => {
                ErrorClass::Feasibility
            }
            LedgerError::CorruptTransaction { .. } | LedgerError::UnknownKind { .. } => {
                ErrorClass::Integrity
            }
        }
    }

    /// Integrity faults mean the log must be repaired upstream.
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Integrity
    }
}

/// Errors raised by the command-line front-end and its adapters.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("script error at line {line}: {reason}")]
    Script { line: u64, reason: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Process exit status for this error.
    pub fn exit_status(&self) -> u8 {
        match self {
            AppError::Io(_) => 1,
            AppError::ConfigParse { .. } | AppError::ConfigInvalid { .. } => 2,
            AppError::Script { .. } => 3,
            AppError::Ledger(e) => match e.class() {
                ErrorClass::Validation => 4,
                ErrorClass::Feasibility => 5,
                ErrorClass::Integrity => 6,
            },
        }
    }
}

impl From<&AppError> for std::process::ExitCode {
    fn from(err: &AppError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
