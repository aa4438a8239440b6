//! CLI definition and dispatch.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::clock_adapter::{FixedClock, SystemClock};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::price_adapter::FixedPriceAdapter;
use crate::adapters::script_adapter::{self, ScriptCommand};
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::account::{Account, AccountOptions};
use crate::domain::error::AppError;
use crate::domain::symbol::Symbol;
use crate::domain::timestamp::{normalize_timestamp, TimeInput};
use crate::ports::clock_port::ClockPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port;
use crate::ports::report_port::ReportPort;

pub const ACCOUNT_SECTION: &str = "account";
pub const DEFAULT_USER_ID: &str = "demo_user";

#[derive(Parser, Debug)]
#[command(name = "tradeledger", about = "Append-only trading account ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a command script and report the resulting account state
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        script: PathBuf,
        /// Report as of this instant (RFC 3339 with offset)
        #[arg(long)]
        as_of: Option<String>,
        /// Pin the clock used for rows without a timestamp
        #[arg(long)]
        now: Option<String>,
        /// Stop at the first rejected command
        #[arg(long)]
        strict: bool,
    },
    /// Show the current price for a symbol
    Price {
        #[arg(short, long)]
        config: Option<PathBuf>,
        symbol: String,
    },
}

/// Outcome of applying a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub applied: usize,
    pub rejected: usize,
}

pub fn run(cli: Cli) -> ExitCode {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let result = match cli.command {
        Command::Run {
            config,
            script,
            as_of,
            now,
            strict,
        } => run_script(
            config.as_deref(),
            &script,
            as_of.as_deref(),
            now.as_deref(),
            strict,
            &mut stdout.lock(),
            &mut stderr.lock(),
        )
        .map(|_| ()),
        Command::Price { config, symbol } => {
            run_price(config.as_deref(), &symbol, &mut stdout.lock())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load an INI file; no path means an empty configuration.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, AppError> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path).map_err(|e| AppError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        }),
        None => FileConfigAdapter::from_string("").map_err(|reason| AppError::ConfigParse {
            file: "<empty>".into(),
            reason,
        }),
    }
}

/// Open an account from the `[account]` and `[prices]` sections.
pub fn build_account(
    config: &dyn ConfigPort,
    clock: Box<dyn ClockPort>,
) -> Result<Account, AppError> {
    let invalid = |key: &str, reason: String| AppError::ConfigInvalid {
        section: ACCOUNT_SECTION.into(),
        key: key.into(),
        reason,
    };

    let declared = config.keys(ACCOUNT_SECTION);
    let user_id = match config.get_string(ACCOUNT_SECTION, "user_id") {
        Some(id) => id,
        None if declared.iter().any(|k| k == "user_id") => {
            return Err(invalid("user_id", "user id must not be empty".into()));
        }
        None => DEFAULT_USER_ID.to_string(),
    };

    let created_at = match config.get_string(ACCOUNT_SECTION, "created_at") {
        Some(raw) => {
            let ts = normalize_timestamp(&TimeInput::from(raw))
                .map_err(|e| invalid("created_at", e.to_string()))?;
            Some(TimeInput::Aware(ts))
        }
        None => None,
    };

    let options = AccountOptions {
        account_id: config.get_string(ACCOUNT_SECTION, "account_id"),
        created_at,
    };
    let prices = FixedPriceAdapter::from_config(config)?;
    Ok(Account::open(&user_id, options, Box::new(prices), clock)?)
}

/// Parse a command-line instant. Naive values are rejected.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, AppError> {
    Ok(normalize_timestamp(&TimeInput::from(raw))?)
}

/// Apply every command in order. Rejections are reported to `err` and
/// skipped unless `strict`; integrity faults always abort.
pub fn apply_script(
    account: &mut Account,
    commands: &[ScriptCommand],
    strict: bool,
    err: &mut dyn Write,
) -> Result<RunSummary, AppError> {
    let mut summary = RunSummary::default();
    for command in commands {
        match script_adapter::apply_command(account, command) {
            Ok(_) => summary.applied += 1,
            Err(e) if e.is_fatal() || strict => return Err(e.into()),
            Err(e) => {
                summary.rejected += 1;
                writeln!(
                    err,
                    "line {}: {} rejected: {}",
                    command.line, command.action, e
                )?;
            }
        }
    }
    Ok(summary)
}

pub fn run_script(
    config_path: Option<&Path>,
    script_path: &Path,
    as_of: Option<&str>,
    now: Option<&str>,
    strict: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<RunSummary, AppError> {
    let config = load_config(config_path)?;
    let clock: Box<dyn ClockPort> = match now {
        Some(raw) => Box::new(FixedClock::new(parse_instant(raw)?)),
        None => Box::new(SystemClock),
    };
    let as_of = as_of.map(parse_instant).transpose()?;

    let mut account = build_account(&config, clock)?;
    let commands = script_adapter::load_script(script_path)?;
    let summary = apply_script(&mut account, &commands, strict, err)?;
    tracing::info!(
        account_id = account.account_id(),
        applied = summary.applied,
        rejected = summary.rejected,
        "script applied"
    );

    TextReportAdapter.write(&account, as_of, out)?;
    Ok(summary)
}

/// Print the normalized quote for one symbol. Only the `[prices]` section
/// is read; no account is opened.
pub fn run_price(
    config_path: Option<&Path>,
    raw_symbol: &str,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let config = load_config(config_path)?;
    let prices = FixedPriceAdapter::from_config(&config)?;
    let symbol = Symbol::parse(raw_symbol)?;
    let price = price_port::quote(&prices, &symbol)?;
    writeln!(out, "{} {}", symbol, price)?;
    Ok(())
}
