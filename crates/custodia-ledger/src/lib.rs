//! # custodia-ledger
//!
//! Append-only, SHA-256 hash-chained audit ledger for PHI access records.
//!
//! ## Overview
//!
//! Every PHI-relevant operation in the surrounding platform calls
//! [`AuditLedger::log_action`] exactly once. The ledger stamps the event,
//! links it to the current chain tail, and durably appends it before
//! returning — tampering with any stored event afterwards breaks the chain
//! and is detected by the verifier in `custodia-verify`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use custodia_ledger::{ActionRequest, AuditLedger, InMemoryAuditStore};
//!
//! let ledger = AuditLedger::new(Arc::new(InMemoryAuditStore::new()));
//! let event = ledger.log_action(
//!     ActionRequest::new("VIEW_PATIENT_RECORD", "dr-smith", "Patient", "patient-123", true)
//!         .detail("reason", "pre-surgery review"),
//! )?;
//! ```

pub mod chain;
pub mod ledger;
pub mod memory;
pub mod store;

pub use chain::hash_event;
pub use ledger::{ActionRequest, AuditLedger};
pub use memory::InMemoryAuditStore;
pub use store::{AuditStore, ScanRange};

// ── Tests ─────────────────────────────────────────────────────────────────────
