//! Canonical serialization shared by the hashing and encryption paths.
//!
//! The audit chain is only as reproducible as the bytes fed into SHA-256.
//! Two conforming implementations must produce byte-identical serializations
//! for the same logical value, so canonical form is pinned down here once and
//! used everywhere:
//!
//! - JSON object keys in lexicographic (byte) order
//! - compact output — no whitespace between tokens
//! - UTF-8, no locale-dependent formatting
//!
//! Routing values through `serde_json::Value` gives the key ordering for
//! free: its map type is a `BTreeMap`, so keys come out sorted regardless of
//! the order the caller inserted them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CustodiaError, CustodiaResult};

/// The opaque ordered mapping carried in an audit event's `details` field.
///
/// `BTreeMap` keeps keys sorted in memory as well as on the wire, so the
/// in-memory order matches the canonical order by construction.
pub type Details = BTreeMap<String, DetailValue>;

/// A single primitive value inside [`Details`].
///
/// Restricted to JSON primitives so the canonical form stays trivial.
/// Non-finite floats canonicalize to JSON `null`; callers that care should
/// not put NaN or infinities into audit details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer (listed before `Float` so whole numbers parse as `Int`).
    Int(i64),
    /// JSON number with a fractional part.
    Float(f64),
    /// JSON string.
    Str(String),
}

impl From<&str> for DetailValue {
    fn from(s: &str) -> Self {
        DetailValue::Str(s.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(s: String) -> Self {
        DetailValue::Str(s)
    }
}

impl From<i64> for DetailValue {
    fn from(n: i64) -> Self {
        DetailValue::Int(n)
    }
}

impl From<f64> for DetailValue {
    fn from(n: f64) -> Self {
        DetailValue::Float(n)
    }
}

impl From<bool> for DetailValue {
    fn from(b: bool) -> Self {
        DetailValue::Bool(b)
    }
}

/// Serialize `value` to canonical bytes.
///
/// The value is first lifted into a `serde_json::Value` — this is what sorts
/// object keys — and then written out compactly. The same function backs
/// both the record-hash input and `encrypt_structured`, which is what makes
/// a hash computed over a structured value reproducible after an
/// encrypt/decrypt round trip.
pub fn to_canonical_vec<T: Serialize>(value: &T) -> CustodiaResult<Vec<u8>> {
    let canonical =
        serde_json::to_value(value).map_err(|e| CustodiaError::Serialization {
            reason: e.to_string(),
        })?;
    serde_json::to_vec(&canonical).map_err(|e| CustodiaError::Serialization {
        reason: e.to_string(),
    })
}
