//! In-memory reference implementation of [`AuditStore`].
//!
//! Keeps all events in a `Vec` behind a `Mutex`. The tail check runs inside
//! the same lock acquisition as the push, so the compare-and-swap contract
//! holds even under concurrent appends without any help from the ledger's
//! own serialization.

use std::sync::Mutex;

use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    event::AuditEvent,
};

use crate::store::{AuditStore, ScanRange};

/// A thread-safe, append-only in-memory audit store.
///
/// Suitable for tests, demos, and single-process deployments where
/// durability is handled elsewhere.
pub struct InMemoryAuditStore {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, event: AuditEvent, expected_tail: &str) -> CustodiaResult<u64> {
        let mut events = self.events.lock().map_err(|e| CustodiaError::AppendFailed {
            reason: format!("audit store lock poisoned: {}", e),
        })?;

        let tail = events
            .last()
            .map(|e| e.record_hash.as_str())
            .unwrap_or(AuditEvent::GENESIS_HASH);

        if tail != expected_tail {
            return Err(CustodiaError::AppendFailed {
                reason: "tail moved: a concurrent writer appended first".to_string(),
            });
        }

        let sequence = events.len() as u64;
        if event.sequence != sequence {
            return Err(CustodiaError::AppendFailed {
                reason: format!(
                    "sequence mismatch: event carries {}, store expects {}",
                    event.sequence, sequence
                ),
            });
        }

        events.push(event);
        Ok(sequence)
    }

    fn tail_hash(&self) -> CustodiaResult<String> {
        let events = self.events.lock().map_err(|e| CustodiaError::AppendFailed {
            reason: format!("audit store lock poisoned: {}", e),
        })?;
        Ok(events
            .last()
            .map(|e| e.record_hash.clone())
            .unwrap_or_else(|| AuditEvent::GENESIS_HASH.to_string()))
    }

    fn scan(&self, range: &ScanRange) -> CustodiaResult<Vec<AuditEvent>> {
        let events = self.events.lock().map_err(|e| CustodiaError::AppendFailed {
            reason: format!("audit store lock poisoned: {}", e),
        })?;
        Ok(events.iter().filter(|e| range.contains(e)).cloned().collect())
    }

    fn event_count(&self) -> CustodiaResult<u64> {
        let events = self.events.lock().map_err(|e| CustodiaError::AppendFailed {
            reason: format!("audit store lock poisoned: {}", e),
        })?;
        Ok(events.len() as u64)
    }
}
