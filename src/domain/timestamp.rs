//! Timestamp normalization. Every stored instant is UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use super::error::LedgerError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A caller-supplied instant, possibly lacking an offset.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeInput {
    Aware(DateTime<Utc>),
    Naive(NaiveDateTime),
    Text(String),
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimeInput {
    fn from(value: DateTime<Tz>) -> Self {
        TimeInput::Aware(value.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        TimeInput::Naive(value)
    }
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        TimeInput::Text(value.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(value: String) -> Self {
        TimeInput::Text(value)
    }
}

/// Convert to UTC, rejecting values without an offset.
pub fn normalize_timestamp(input: &TimeInput) -> Result<DateTime<Utc>, LedgerError> {
    match input {
        TimeInput::Aware(dt) => Ok(*dt),
        TimeInput::Naive(naive) => Err(LedgerError::NaiveTimestamp {
            input: naive.to_string(),
        }),
        TimeInput::Text(raw) => parse_text(raw),
    }
}

fn parse_text(raw: &str) -> Result<DateTime<Utc>, LedgerError> {
    let trimmed = raw.trim();
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => {
            if NAIVE_FORMATS
                .iter()
                .any(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).is_ok())
            {
                return Err(LedgerError::NaiveTimestamp {
                    input: raw.to_string(),
                });
            }
            Err(LedgerError::InvalidTimestamp {
                input: raw.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
