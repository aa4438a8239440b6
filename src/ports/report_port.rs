//! Report generation port trait.

use chrono::{DateTime, Utc};
use std::io::Write;

use crate::domain::account::Account;
use crate::domain::error::AppError;

/// Port for rendering an account's state as of an instant.
pub trait ReportPort {
    fn write(
        &self,
        account: &Account,
        as_of: Option<DateTime<Utc>>,
        out: &mut dyn Write,
    ) -> Result<(), AppError>;
}
