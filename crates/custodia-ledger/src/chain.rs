//! Record-hash computation for the audit chain.
//!
//! Hash input layout (bytes, in order):
//!   1. `previous_hash` as UTF-8 bytes (64 ASCII hex chars, or the genesis
//!      constant)
//!   2. canonical JSON of every other event field except `record_hash`
//!      (lexicographically sorted keys, compact, UTF-8)
//!
//! The concatenation is fed to `custodia_crypto::hash_data`. Every field
//! that contributes is listed explicitly in `HashedFields` so nothing is
//! accidentally omitted — and so the layout is reproducible by an
//! independent implementation working from this description alone.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use custodia_contracts::{canonical, canonical::Details, error::CustodiaResult, event::AuditEvent};
use custodia_crypto::hash_data;

/// The event fields covered by `record_hash`, minus `previous_hash` (which
/// is prepended raw) and `record_hash` itself.
///
/// Field names match `AuditEvent` so the canonical JSON keys line up with
/// the stored record.
#[derive(Serialize)]
struct HashedFields<'a> {
    id: &'a Uuid,
    timestamp: &'a DateTime<Utc>,
    action: &'a str,
    actor_id: &'a str,
    actor_role: &'a Option<String>,
    resource_type: &'a str,
    resource_id: &'a str,
    ip_address: &'a Option<String>,
    user_agent: &'a Option<String>,
    response_status: &'a Option<u16>,
    phi_accessed: bool,
    details: &'a Details,
    sequence: u64,
}

/// Compute the record hash for `event` from its stored fields.
///
/// Ignores whatever is currently in `event.record_hash`, so the same
/// function serves both the ledger (before the hash exists) and the
/// verifier (recomputing it from a persisted event).
///
/// Returns a lowercase 64-character hex string.
pub fn hash_event(event: &AuditEvent) -> CustodiaResult<String> {
    let body = canonical::to_canonical_vec(&HashedFields {
        id: &event.id,
        timestamp: &event.timestamp,
        action: &event.action,
        actor_id: &event.actor_id,
        actor_role: &event.actor_role,
        resource_type: &event.resource_type,
        resource_id: &event.resource_id,
        ip_address: &event.ip_address,
        user_agent: &event.user_agent,
        response_status: &event.response_status,
        phi_accessed: event.phi_accessed,
        details: &event.details,
        sequence: event.sequence,
    })?;

    let mut input = Vec::with_capacity(event.previous_hash.len() + body.len());
    input.extend_from_slice(event.previous_hash.as_bytes());
    input.extend_from_slice(&body);

    Ok(hash_data(&input))
}
