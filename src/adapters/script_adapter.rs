//! CSV command script adapter.
//!
//! A script is a header row `timestamp,action,symbol,value,note` followed by
//! one command per row. `timestamp`, `symbol` and `note` may be empty.

use std::fs;
use std::path::Path;

use crate::domain::account::Account;
use crate::domain::commands::CommandOptions;
use crate::domain::error::{AppError, LedgerError};
use crate::domain::transaction::{Transaction, TransactionKind};

const HEADER: [&str; 5] = ["timestamp", "action", "symbol", "value", "note"];

/// One parsed script row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptCommand {
    pub line: u64,
    pub timestamp: Option<String>,
    pub action: TransactionKind,
    pub symbol: Option<String>,
    pub value: String,
    pub note: Option<String>,
}

pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Vec<ScriptCommand>, AppError> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_script(&content)
}

pub fn parse_script(content: &str) -> Result<Vec<ScriptCommand>, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(|e| AppError::Script {
        line: 1,
        reason: format!("CSV parse error: {}", e),
    })?;
    let found: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    if found.len() < 4 || found.iter().zip(HEADER).any(|(f, want)| f != want) {
        return Err(AppError::Script {
            line: 1,
            reason: format!("expected header {:?}, got {:?}", HEADER.join(","), found),
        });
    }

    let mut commands = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| AppError::Script {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let script_err = |reason: String| AppError::Script { line, reason };
        let optional = |idx: usize| {
            record
                .get(idx)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let action = record
            .get(1)
            .ok_or_else(|| script_err("missing action column".into()))?
            .parse::<TransactionKind>()
            .map_err(|e| script_err(e.to_string()))?;

        let value = record
            .get(3)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| script_err("missing value column".into()))?
            .to_string();

        let symbol = optional(2);
        if action.is_trade() && symbol.is_none() {
            return Err(script_err(format!("{} requires a symbol", action)));
        }

        commands.push(ScriptCommand {
            line,
            timestamp: optional(0),
            action,
            symbol,
            value,
            note: optional(4),
        });
    }
    Ok(commands)
}

/// Dispatch one script row to the matching account command.
pub fn apply_command(
    account: &mut Account,
    command: &ScriptCommand,
) -> Result<Transaction, LedgerError> {
    let mut options = match &command.timestamp {
        Some(ts) => CommandOptions::at(ts.as_str()),
        None => CommandOptions::now(),
    };
    options.note = command.note.clone();

    let value = command.value.as_str();
    let symbol = command.symbol.as_deref().unwrap_or("");
    match command.action {
        TransactionKind::Deposit => account.deposit(value, options),
        TransactionKind::Withdraw => account.withdraw(value, options),
        TransactionKind::Buy => account.buy(symbol, value, options),
        TransactionKind::Sell => account.sell(symbol, value, options),
    }
}
