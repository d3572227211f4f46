//! The audit store contract — the ledger's one external collaborator.
//!
//! A store is durable, ordered, append-only storage. The trait exposes no
//! update or delete: once a row is in, it stays byte-identical forever as
//! far as the ledger's API is concerned.
//!
//! The append carries the tail hash the caller observed. A store shared by
//! multiple processes MUST compare it against its actual tail inside the
//! same transaction as the insert (compare-and-swap on the tail, or a row
//! lock on a singleton tail record) and reject on mismatch — that is what
//! keeps the chain fork-free when more than one ledger instance writes to
//! one durable store.

use chrono::{DateTime, Utc};

use custodia_contracts::{error::CustodiaResult, event::AuditEvent};

/// Which slice of the ledger to scan, always in append order.
#[derive(Debug, Clone)]
pub enum ScanRange {
    /// Every event in the store.
    All,
    /// Events with `start <= sequence < end` (unbounded end when `None`).
    Sequence { start: u64, end: Option<u64> },
    /// Events with `start <= timestamp < end`.
    Time {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl ScanRange {
    /// The whole ledger.
    pub fn all() -> Self {
        ScanRange::All
    }

    /// From `start` (inclusive) to the current tail.
    pub fn from_sequence(start: u64) -> Self {
        ScanRange::Sequence { start, end: None }
    }

    /// `start` inclusive, `end` exclusive.
    pub fn sequence(start: u64, end: u64) -> Self {
        ScanRange::Sequence {
            start,
            end: Some(end),
        }
    }

    /// Events whose timestamp falls in `[start, end)`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        ScanRange::Time { start, end }
    }

    /// True when `event` falls inside this range.
    pub fn contains(&self, event: &AuditEvent) -> bool {
        match self {
            ScanRange::All => true,
            ScanRange::Sequence { start, end } => {
                event.sequence >= *start && end.map_or(true, |e| event.sequence < e)
            }
            ScanRange::Time { start, end } => {
                event.timestamp >= *start && event.timestamp < *end
            }
        }
    }
}

/// Durable, ordered, append-only storage for audit events.
///
/// Implementations must be safe to share across threads; the ledger wraps
/// one in an `Arc` and calls it from every producer.
pub trait AuditStore: Send + Sync {
    /// Atomically append `event`, provided the store's tail hash still
    /// equals `expected_tail` (the genesis constant for an empty store).
    ///
    /// On mismatch the store must reject with `AppendFailed` and persist
    /// nothing — a lost compare-and-swap means another writer appended
    /// first, and chaining two events to one predecessor would fork the
    /// chain. A crash mid-append must leave the store either without the
    /// event or with it fully written; partial rows are not a valid
    /// observable state.
    ///
    /// Returns the sequence number the event was stored at.
    fn append(&self, event: AuditEvent, expected_tail: &str) -> CustodiaResult<u64>;

    /// The `record_hash` of the last appended event, or the genesis
    /// constant when the store is empty.
    fn tail_hash(&self) -> CustodiaResult<String>;

    /// All events in `range`, in append order, as a snapshot taken at the
    /// time of the call.
    fn scan(&self, range: &ScanRange) -> CustodiaResult<Vec<AuditEvent>>;

    /// Number of events currently stored.
    fn event_count(&self) -> CustodiaResult<u64>;
}
