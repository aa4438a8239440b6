//! Command validator: deposit, withdraw, buy, sell.
//!
//! Each command resolves its timestamp, normalizes numeric input, checks
//! feasibility against the ledger as of that timestamp, and only then
//! appends. A rejected command leaves the ledger untouched and is logged at
//! warn level whatever its error class.

use chrono::{DateTime, Utc};

use super::account::Account;
use super::error::LedgerError;
use super::money::{Money, Numeric, Quantity};
use super::replay;
use super::symbol::Symbol;
use super::timestamp::{normalize_timestamp, TimeInput};
use super::transaction::{Transaction, TransactionKind};

/// Per-command timestamp and note. A missing timestamp means "now".
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    pub timestamp: Option<TimeInput>,
    pub note: Option<String>,
}

impl CommandOptions {
    pub fn now() -> Self {
        Self::default()
    }

    pub fn at(timestamp: impl Into<TimeInput>) -> Self {
        CommandOptions {
            timestamp: Some(timestamp.into()),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl Account {
    pub fn deposit(
        &mut self,
        amount: impl Into<Numeric>,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        self.try_deposit(amount.into(), options)
            .inspect_err(|err| self.log_rejection(TransactionKind::Deposit, err))
    }

    pub fn withdraw(
        &mut self,
        amount: impl Into<Numeric>,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        self.try_withdraw(amount.into(), options)
            .inspect_err(|err| self.log_rejection(TransactionKind::Withdraw, err))
    }

    pub fn buy(
        &mut self,
        symbol: &str,
        quantity: impl Into<Numeric>,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        self.try_buy(symbol, quantity.into(), options)
            .inspect_err(|err| self.log_rejection(TransactionKind::Buy, err))
    }

    pub fn sell(
        &mut self,
        symbol: &str,
        quantity: impl Into<Numeric>,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        self.try_sell(symbol, quantity.into(), options)
            .inspect_err(|err| self.log_rejection(TransactionKind::Sell, err))
    }

    fn try_deposit(
        &mut self,
        amount: Numeric,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        let ts = self.resolve_timestamp(&options)?;
        let amount = Money::positive("deposit amount", &amount)?;
        self.admit(Transaction::cash(
            TransactionKind::Deposit,
            ts,
            amount,
            options.note,
        ))
    }

    fn try_withdraw(
        &mut self,
        amount: Numeric,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        let ts = self.resolve_timestamp(&options)?;
        let amount = Money::positive("withdraw amount", &amount)?;

        let cash = self.cash_balance(Some(ts))?;
        if cash < amount {
            return Err(LedgerError::InsufficientFunds {
                available: cash.value(),
                required: amount.value(),
            });
        }

        self.admit(Transaction::cash(
            TransactionKind::Withdraw,
            ts,
            amount,
            options.note,
        ))
    }

    fn try_buy(
        &mut self,
        symbol: &str,
        quantity: Numeric,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        let ts = self.resolve_timestamp(&options)?;
        let (symbol, price) = self.resolve_symbol(symbol)?;
        let quantity = Quantity::positive("quantity", &quantity)?;
        let tx = Transaction::trade(
            TransactionKind::Buy,
            ts,
            symbol,
            quantity,
            price,
            options.note,
        )?;

        let cash = self.cash_balance(Some(ts))?;
        if cash < tx.amount() {
            return Err(LedgerError::InsufficientFunds {
                available: cash.value(),
                required: tx.amount().value(),
            });
        }

        self.admit(tx)
    }

    fn try_sell(
        &mut self,
        symbol: &str,
        quantity: Numeric,
        options: CommandOptions,
    ) -> Result<Transaction, LedgerError> {
        let ts = self.resolve_timestamp(&options)?;
        let (symbol, price) = self.resolve_symbol(symbol)?;
        let quantity = Quantity::positive("quantity", &quantity)?;

        let held = self.replay(Some(ts))?.held(&symbol);
        if held < quantity {
            return Err(LedgerError::InsufficientHoldings {
                symbol: symbol.to_string(),
                held: held.value(),
                requested: quantity.value(),
            });
        }

        self.admit(Transaction::trade(
            TransactionKind::Sell,
            ts,
            symbol,
            quantity,
            price,
            options.note,
        )?)
    }

    fn resolve_timestamp(&self, options: &CommandOptions) -> Result<DateTime<Utc>, LedgerError> {
        match &options.timestamp {
            Some(input) => normalize_timestamp(input),
            None => Ok(self.clock.now()),
        }
    }

    /// Normalize the symbol and require the oracle to price it.
    fn resolve_symbol(&self, raw: &str) -> Result<(Symbol, Money), LedgerError> {
        let symbol = Symbol::parse(raw)?;
        let price = self.quote(&symbol)?;
        Ok((symbol, price))
    }

    fn log_rejection(&self, kind: TransactionKind, err: &LedgerError) {
        tracing::warn!(
            account_id = self.account_id(),
            %kind,
            class = ?err.class(),
            error = %err,
            "command rejected"
        );
    }

    /// Appends `tx` only if the ledger with `tx` in place still folds; every
    /// as-of prefix then folds too.
    fn admit(&mut self, tx: Transaction) -> Result<Transaction, LedgerError> {
        replay::replay(self.ledger.with_candidate(&tx))?;
        replay::net_contributions(self.ledger.with_candidate(&tx))?;

        tracing::debug!(
            account_id = self.account_id(),
            id = %tx.id(),
            kind = %tx.kind(),
            amount = %tx.amount(),
            timestamp = %tx.timestamp(),
            "transaction admitted"
        );
        self.ledger.append(tx.clone());
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock_adapter::FixedClock;
    use crate::adapters::price_adapter::FixedPriceAdapter;
    use crate::domain::account::AccountOptions;
    use crate::domain::error::ErrorClass;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    fn account() -> Account {
        Account::open(
            "u1",
            AccountOptions::default(),
            Box::new(FixedPriceAdapter::default_table()),
            Box::new(FixedClock::new(at(20))),
        )
        .unwrap()
    }

    #[test]
    fn deposit_rounds_half_up() {
        let mut acct = account();
        let tx = acct.deposit("10.005", CommandOptions::at(at(10))).unwrap();
        assert_eq!(tx.amount().value(), dec!(10.01));
        assert_eq!(tx.kind(), TransactionKind::Deposit);
        assert_eq!(acct.ledger().len(), 1);
    }

    #[test]
    fn deposit_defaults_to_clock_time() {
        let mut acct = account();
        let tx = acct.deposit(5, CommandOptions::now().with_note("gift")).unwrap();
        assert_eq!(tx.timestamp(), at(20));
        assert_eq!(tx.note(), Some("gift"));
    }

    #[test]
    fn non_positive_and_non_numeric_amounts_are_rejected() {
        let mut acct = account();
        for bad in ["0", "-1", "0.004", "ten", ""] {
            let err = acct.deposit(bad, CommandOptions::at(at(10))).unwrap_err();
            assert!(
                matches!(
                    err,
                    LedgerError::NonPositive { .. } | LedgerError::NotANumber { .. }
                ),
                "{bad:?} gave {err:?}"
            );
        }
        assert!(acct.withdraw(Decimal::ZERO, CommandOptions::at(at(10))).is_err());
        assert!(acct.ledger().is_empty());
    }

    #[test]
    fn naive_timestamp_is_rejected() {
        let mut acct = account();
        let err = acct
            .deposit("1", CommandOptions::at("2025-01-01T10:00:00"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NaiveTimestamp { .. }));
        assert!(acct.ledger().is_empty());
    }

    #[test]
    fn withdraw_boundary() {
        let mut acct = account();
        acct.deposit("5.00", CommandOptions::at(at(10))).unwrap();

        let err = acct.withdraw("5.01", CommandOptions::at(at(11))).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(acct.ledger().len(), 1);

        acct.withdraw("5.00", CommandOptions::at(at(11))).unwrap();
        assert_eq!(acct.cash_balance(None).unwrap().value(), dec!(0.00));
    }

    #[test]
    fn buy_records_price_quantity_and_cost() {
        let mut acct = account();
        acct.deposit("1000", CommandOptions::at(at(10))).unwrap();
        let tx = acct.buy(" aapl ", "1.123456789", CommandOptions::at(at(11))).unwrap();
        assert_eq!(tx.symbol().unwrap().as_str(), "AAPL");
        assert_eq!(tx.quantity().unwrap().value(), dec!(1.12345679));
        assert_eq!(tx.price().unwrap().value(), dec!(180.00));
        assert_eq!(tx.amount().value(), dec!(202.22));
    }

    #[test]
    fn buy_rejects_bad_symbols() {
        let mut acct = account();
        acct.deposit("1000", CommandOptions::at(at(10))).unwrap();
        for bad in ["", "1ABC", "AA-PL"] {
            assert!(matches!(
                acct.buy(bad, "1", CommandOptions::at(at(11))),
                Err(LedgerError::InvalidSymbol { .. })
            ));
        }
        assert!(matches!(
            acct.buy("MSFT", "1", CommandOptions::at(at(11))),
            Err(LedgerError::PriceUnavailable { .. })
        ));
        assert_eq!(acct.ledger().len(), 1);
    }

    #[test]
    fn buy_checks_cash_as_of_its_own_timestamp() {
        let mut acct = account();
        acct.deposit("1000", CommandOptions::at(at(12))).unwrap();
        // Funds arrive at 12:00, so a buy at 11:00 has nothing to spend.
        let err = acct.buy("AAPL", "1", CommandOptions::at(at(11))).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        acct.buy("AAPL", "1", CommandOptions::at(at(12))).unwrap();
    }

    #[test]
    fn buy_insufficient_funds() {
        let mut acct = account();
        acct.deposit("179.99", CommandOptions::at(at(10))).unwrap();
        let err = acct.buy("AAPL", "1", CommandOptions::at(at(11))).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                available: dec!(179.99),
                required: dec!(180.00),
            }
        );
    }

    #[test]
    fn sell_more_than_held_is_rejected() {
        let mut acct = account();
        acct.deposit("1000", CommandOptions::at(at(10))).unwrap();
        acct.buy("TSLA", "1", CommandOptions::at(at(11))).unwrap();
        let err = acct
            .sell("TSLA", "1.00000001", CommandOptions::at(at(12)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientHoldings { .. }));

        let tx = acct.sell("tsla", "1", CommandOptions::at(at(12))).unwrap();
        assert_eq!(tx.amount().value(), dec!(250.00));
        assert!(acct.holdings(None).unwrap().is_empty());
        assert_eq!(acct.cash_balance(None).unwrap().value(), dec!(1000.00));
    }

    #[test]
    fn sell_before_buy_timestamp_is_rejected() {
        let mut acct = account();
        acct.deposit("1000", CommandOptions::at(at(10))).unwrap();
        acct.buy("TSLA", "1", CommandOptions::at(at(12))).unwrap();
        assert!(matches!(
            acct.sell("TSLA", "1", CommandOptions::at(at(11))),
            Err(LedgerError::InsufficientHoldings { .. })
        ));
    }

    #[test]
    fn same_timestamp_commands_see_earlier_ones() {
        let mut acct = account();
        acct.deposit("100", CommandOptions::at(at(10))).unwrap();
        acct.withdraw("100", CommandOptions::at(at(10))).unwrap();
        assert_eq!(acct.cash_balance(Some(at(10))).unwrap(), Money::ZERO);
    }

    #[test]
    fn buy_cost_past_decimal_range_is_out_of_range() {
        let mut acct = account();
        acct.deposit("1000", CommandOptions::at(at(1))).unwrap();
        let err = acct.buy("AAPL", "1e27", CommandOptions::at(at(2))).unwrap_err();
        assert_eq!(
            err,
            LedgerError::OutOfRange {
                operation: "multiplication"
            }
        );
        assert_eq!(err.class(), ErrorClass::Validation);
        assert_eq!(acct.ledger().len(), 1);
    }

    #[test]
    fn deposit_that_would_overflow_cash_is_not_admitted() {
        let mut acct = account();
        let max = "79228162514264337593543950335";
        acct.deposit(max, CommandOptions::at(at(1))).unwrap();
        let err = acct.deposit(max, CommandOptions::at(at(2))).unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange { operation: "addition" });
        assert_eq!(acct.ledger().len(), 1);
        assert_eq!(acct.cash_balance(None).unwrap().value(), Decimal::MAX);
        assert_eq!(acct.net_contributions(None).unwrap().value(), Decimal::MAX);
    }

    #[test]
    fn backdated_deposit_that_overflows_a_later_balance_is_not_admitted() {
        let mut acct = account();
        acct.deposit(Decimal::MAX, CommandOptions::at(at(10))).unwrap();
        // Cash is zero at 05:00, but every later prefix would overflow.
        let err = acct.deposit("1", CommandOptions::at(at(5))).unwrap_err();
        assert!(matches!(err, LedgerError::OutOfRange { .. }));
        assert_eq!(acct.ledger().len(), 1);
        assert_eq!(acct.cash_balance(None).unwrap().value(), Decimal::MAX);
    }

    #[test]
    fn sell_proceeds_that_would_overflow_cash_are_not_admitted() {
        let mut acct = account();
        acct.deposit(Decimal::MAX, CommandOptions::at(at(1))).unwrap();
        acct.buy("AAPL", "1", CommandOptions::at(at(2))).unwrap();
        acct.prices = Box::new(FixedPriceAdapter::new([(
            Symbol::parse("AAPL").unwrap(),
            dec!(1000),
        )]));

        let err = acct.sell("AAPL", "1", CommandOptions::at(at(3))).unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange { operation: "addition" });
        assert_eq!(acct.ledger().len(), 2);
        assert_eq!(acct.cash_balance(None).unwrap().value(), Decimal::MAX - dec!(180));
        // Valuing the held share at the new price overflows equity, as an error.
        assert_eq!(
            acct.snapshot(None).unwrap_err(),
            LedgerError::OutOfRange { operation: "addition" }
        );
    }

    mod rejection_logging {
        use super::*;
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct CapturedLog(Arc<Mutex<Vec<u8>>>);

        impl io::Write for CapturedLog {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        fn captured(run: impl FnOnce()) -> String {
            let log = CapturedLog::default();
            let writer = log.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            tracing::subscriber::with_default(subscriber, run);
            let bytes = log.0.lock().unwrap().clone();
            String::from_utf8(bytes).unwrap()
        }

        #[test]
        fn validation_rejections_are_logged() {
            let output = captured(|| {
                let mut acct = account();
                acct.deposit("-5", CommandOptions::at(at(10))).unwrap_err();
                acct.deposit("1", CommandOptions::at("2025-01-01T10:00:00"))
                    .unwrap_err();
                acct.buy("1ABC", "1", CommandOptions::at(at(10))).unwrap_err();
                acct.sell("MSFT", "1", CommandOptions::at(at(10))).unwrap_err();
            });
            assert_eq!(output.matches("command rejected").count(), 4, "{output}");
            assert!(output.contains("class=Validation"));
            assert!(output.contains("kind=DEPOSIT"));
            assert!(output.contains("kind=SELL"));
        }

        #[test]
        fn feasibility_rejections_are_logged() {
            let output = captured(|| {
                let mut acct = account();
                acct.withdraw("1", CommandOptions::at(at(10))).unwrap_err();
            });
            assert!(output.contains("WARN"));
            assert!(output.contains("class=Feasibility"));
            assert!(output.contains("kind=WITHDRAW"));
        }

        #[test]
        fn admitted_commands_log_no_warning() {
            let output = captured(|| {
                let mut acct = account();
                acct.deposit("1", CommandOptions::at(at(10))).unwrap();
            });
            assert!(!output.contains("command rejected"));
        }
    }
}
