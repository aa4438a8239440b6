//! Plain-text report adapter implementing ReportPort.
//!
//! Renders the valuation summary, the holdings table and the transaction
//! log as aligned text columns.

use chrono::{DateTime, Utc};
use std::io::Write;

use crate::domain::account::{Account, HoldingValuation, Snapshot};
use crate::domain::error::AppError;
use crate::domain::transaction::Transaction;
use crate::ports::report_port::ReportPort;

pub struct TextReportAdapter;

pub fn format_snapshot(account: &Account, as_of: Option<DateTime<Utc>>, snap: &Snapshot) -> String {
    let as_of = match as_of {
        Some(ts) => ts.to_rfc3339(),
        None => "latest".to_string(),
    };
    let pct = match snap.profit_loss_pct {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    };
    let mut out = String::new();
    out.push_str(&format!(
        "Account {} (user {}) as of {}\n",
        account.account_id(),
        account.user_id(),
        as_of
    ));
    out.push_str(&format!("  Cash balance       {:>14}\n", snap.cash.to_string()));
    out.push_str(&format!("  Portfolio value    {:>14}\n", snap.portfolio_value.to_string()));
    out.push_str(&format!("  Equity             {:>14}\n", snap.equity.to_string()));
    out.push_str(&format!("  Net contributions  {:>14}\n", snap.net_contributions.to_string()));
    out.push_str(&format!("  Profit / loss      {:>14}\n", snap.profit_loss.to_string()));
    out.push_str(&format!("  Profit / loss %    {:>14}\n", pct));
    out
}

pub fn format_holdings_table(rows: &[HoldingValuation]) -> String {
    if rows.is_empty() {
        return "No holdings.\n".to_string();
    }

    let mut out = format!(
        "{:<10} {:>18} {:>12} {:>14}\n",
        "SYMBOL", "QUANTITY", "PRICE", "VALUE"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<10} {:>18} {:>12} {:>14}\n",
            row.symbol.as_str(),
            row.quantity.trimmed(),
            row.price.to_string(),
            row.value.to_string()
        ));
    }
    out
}

pub fn format_transactions_table(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions.\n".to_string();
    }

    let mut out = format!(
        "{:<20} {:<8} {:<8} {:>18} {:>10} {:>12}  {}\n",
        "TIMESTAMP", "TYPE", "SYMBOL", "QUANTITY", "PRICE", "AMOUNT", "NOTE"
    );
    for tx in transactions {
        out.push_str(&format!(
            "{:<20} {:<8} {:<8} {:>18} {:>10} {:>12}  {}\n",
            tx.timestamp().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            tx.kind().as_str(),
            tx.symbol().map(|s| s.as_str()).unwrap_or(""),
            tx.quantity().map(|q| q.trimmed()).unwrap_or_default(),
            tx.price().map(|p| p.to_string()).unwrap_or_default(),
            tx.amount().to_string(),
            tx.note().unwrap_or("")
        ));
    }
    out
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        account: &Account,
        as_of: Option<DateTime<Utc>>,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        let snap = account.snapshot(as_of)?;
        let holdings = account.holding_valuations(as_of)?;
        let transactions = account.transactions(None, as_of);

        writeln!(out, "{}", format_snapshot(account, as_of, &snap))?;
        writeln!(out, "Holdings")?;
        writeln!(out, "{}", format_holdings_table(&holdings))?;
        writeln!(out, "Transactions")?;
        write!(out, "{}", format_transactions_table(transactions))?;
        Ok(())
    }
}
