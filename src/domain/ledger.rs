//! Append-only, timestamp-ordered transaction store.

use chrono::{DateTime, Utc};

use super::transaction::Transaction;

/// Ordered sequence of transactions for one account.
///
/// Invariant: entries are in non-decreasing timestamp order, and among equal
/// timestamps they are in admission order (a new entry sorts after every
/// existing entry with the same timestamp).
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    entries: Vec<Transaction>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the first position whose timestamp is strictly later than
    /// `tx`, which keeps equal timestamps in admission order.
    pub fn append(&mut self, tx: Transaction) {
        let at = self.insertion_point(tx.timestamp);
        self.entries.insert(at, tx);
    }

    /// Every entry with `tx` placed where [`append`](Self::append) would put
    /// it, without storing it.
    pub fn with_candidate<'a>(
        &'a self,
        tx: &'a Transaction,
    ) -> impl Iterator<Item = &'a Transaction> {
        let (before, after) = self.entries.split_at(self.insertion_point(tx.timestamp));
        before.iter().chain(std::iter::once(tx)).chain(after)
    }

    fn insertion_point(&self, timestamp: DateTime<Utc>) -> usize {
        self.entries
            .partition_point(|existing| existing.timestamp <= timestamp)
    }

    pub fn all(&self) -> &[Transaction] {
        &self.entries
    }

    /// Entries with `start <= timestamp <= end`; a missing bound is open.
    pub fn range(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> &[Transaction] {
        let lo = match start {
            Some(s) => self.entries.partition_point(|tx| tx.timestamp < s),
            None => 0,
        };
        let hi = match end {
            Some(e) => self.entries.partition_point(|tx| tx.timestamp <= e),
            None => self.entries.len(),
        };
        if lo >= hi {
            return &[];
        }
        &self.entries[lo..hi]
    }

    /// The prefix with `timestamp <= as_of`, or everything.
    pub fn up_to(&self, as_of: Option<DateTime<Utc>>) -> &[Transaction] {
        self.range(None, as_of)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
