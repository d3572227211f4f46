//! The audit ledger: construction and durable append of chained events.
//!
//! `log_action` is the producer interface — called once per PHI-relevant
//! operation by the surrounding platform layers. The read-tail → hash →
//! append sequence is the ledger's one critical section: it runs under an
//! in-process mutex here, and the store's own tail compare-and-swap covers
//! the multi-process case (see [`crate::store::AuditStore::append`]).

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, error};
use uuid::Uuid;

use custodia_contracts::{
    canonical::{DetailValue, Details},
    error::{CustodiaError, CustodiaResult},
    event::AuditEvent,
};

use crate::{chain::hash_event, store::AuditStore};

/// Everything the caller supplies about one auditable action.
///
/// Built with `new` plus chained setters:
///
/// ```rust,ignore
/// let req = ActionRequest::new("VIEW_PATIENT_RECORD", "dr-smith", "Patient", "patient-123", true)
///     .actor_role("doctor")
///     .detail("reason", "pre-surgery review");
/// let event = ledger.log_action(req)?;
/// ```
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub action: String,
    pub actor_id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub phi_accessed: bool,
    pub details: Details,
    pub actor_role: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub response_status: Option<u16>,
    /// Creation instant override. The clock is a caller-side collaborator;
    /// when unset the ledger stamps `Utc::now()`.
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActionRequest {
    /// A request with the mandatory fields; everything else defaults to empty.
    pub fn new(
        action: impl Into<String>,
        actor_id: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        phi_accessed: bool,
    ) -> Self {
        Self {
            action: action.into(),
            actor_id: actor_id.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            phi_accessed,
            details: Details::new(),
            actor_role: None,
            ip_address: None,
            user_agent: None,
            response_status: None,
            timestamp: None,
        }
    }

    /// Attach one detail key/value pair.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<DetailValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Role of the acting principal (doctor, nurse, admin, researcher).
    pub fn actor_role(mut self, role: impl Into<String>) -> Self {
        self.actor_role = Some(role.into());
        self
    }

    /// Client IP address of the triggering request.
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Client user agent of the triggering request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// HTTP status code of the triggering request.
    pub fn response_status(mut self, status: u16) -> Self {
        self.response_status = Some(status);
        self
    }

    /// Stamp the event with `at` instead of the ledger's clock.
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }
}

/// Append-only, order-preserving, hash-chained record of PHI-relevant
/// actions.
///
/// # Concurrency
///
/// Any number of threads may call [`log_action`](AuditLedger::log_action)
/// concurrently. Appends are serialized per ledger instance, so no two
/// events ever chain to the same `previous_hash`, and append order equals
/// observed commit order. Verification (in `custodia-verify`) is read-only
/// and runs concurrently with appends without coordination.
pub struct AuditLedger {
    store: Arc<dyn AuditStore>,
    append_lock: Mutex<()>,
}

impl AuditLedger {
    /// Build a ledger over `store`.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self {
            store,
            append_lock: Mutex::new(()),
        }
    }

    /// The underlying store, e.g. to hand to a verifier.
    pub fn store(&self) -> Arc<dyn AuditStore> {
        Arc::clone(&self.store)
    }

    /// Construct, hash, and durably append one audit event.
    ///
    /// Under the critical section: read the current tail hash, build the
    /// event (fresh id, next sequence), compute `record_hash` over the
    /// canonical serialization of every other field, and append with the
    /// observed tail as the compare-and-swap witness.
    ///
    /// Returns the persisted event. On any failure the event was not
    /// appended and the error surfaces to the caller — the triggering
    /// action must itself be treated as not-yet-completed, and the core
    /// never retries (a transparent retry risks duplicating or forking the
    /// chain).
    pub fn log_action(&self, req: ActionRequest) -> CustodiaResult<AuditEvent> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|e| CustodiaError::AppendFailed {
                reason: format!("append lock poisoned: {}", e),
            })?;

        let previous_hash = self.store.tail_hash()?;
        let sequence = self.store.event_count()?;

        let mut event = AuditEvent {
            id: Uuid::new_v4(),
            timestamp: req.timestamp.unwrap_or_else(Utc::now),
            action: req.action,
            actor_id: req.actor_id,
            actor_role: req.actor_role,
            resource_type: req.resource_type,
            resource_id: req.resource_id,
            ip_address: req.ip_address,
            user_agent: req.user_agent,
            response_status: req.response_status,
            phi_accessed: req.phi_accessed,
            details: req.details,
            sequence,
            previous_hash: previous_hash.clone(),
            record_hash: String::new(),
        };
        event.record_hash = hash_event(&event)?;

        match self.store.append(event.clone(), &previous_hash) {
            Ok(assigned) => {
                debug!(
                    sequence = assigned,
                    event_id = %event.id,
                    action = %event.action,
                    phi_accessed = event.phi_accessed,
                    "audit event appended"
                );
                Ok(event)
            }
            Err(e) => {
                error!(action = %event.action, "audit append failed: {}", e);
                Err(e)
            }
        }
    }
}
