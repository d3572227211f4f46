//! The audit event — one immutable record per PHI-relevant action.
//!
//! `AuditEvent` is a single entry in the SHA-256 hash chain. Each event
//! commits to its predecessor via `previous_hash`, so modifying any field of
//! any persisted event — even a single byte — invalidates `record_hash` or a
//! later event's link, which the chain verifier detects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canonical::Details;

/// One immutable, hash-chained record of a PHI-relevant action.
///
/// Events are constructed by the ledger and never mutated after
/// `record_hash` is computed. The ledger is append-only: no update or
/// delete is ever exposed for persisted events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Globally unique identifier, assigned at creation, never reused.
    pub id: Uuid,

    /// Creation-time instant (UTC). Monotonicity is desired but not
    /// enforced — the clock is a caller-side collaborator.
    pub timestamp: DateTime<Utc>,

    /// Short symbolic name of the operation (e.g. "VIEW_PATIENT_RECORD").
    pub action: String,

    /// Identity of the principal performing the action.
    pub actor_id: String,

    /// Role of the principal (doctor, nurse, admin, researcher), if known.
    pub actor_role: Option<String>,

    /// Type of the entity acted upon (e.g. "Patient").
    pub resource_type: String,

    /// Identifier of the entity acted upon.
    pub resource_id: String,

    /// Client IP address, if the action arrived over the network.
    pub ip_address: Option<String>,

    /// Client user agent string, if any.
    pub user_agent: Option<String>,

    /// HTTP status code of the triggering request, if applicable.
    pub response_status: Option<u16>,

    /// True when PHI was read or written during the action.
    pub phi_accessed: bool,

    /// Opaque ordered key/value context, canonically serialized into the
    /// record hash.
    pub details: Details,

    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// Hex SHA-256 of the immediately preceding event's canonical content,
    /// or [`AuditEvent::GENESIS_HASH`] for the first event.
    pub previous_hash: String,

    /// Hex SHA-256 over every other field of this event, including
    /// `previous_hash`. A pure function of those fields — computed once,
    /// never stored ahead of computation, never mutated afterwards.
    pub record_hash: String,
}

impl AuditEvent {
    /// The sentinel `previous_hash` for the first event in an empty ledger.
    ///
    /// 64 hex zeros — a value that can never be the SHA-256 of real data,
    /// making genesis detection unambiguous.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}
