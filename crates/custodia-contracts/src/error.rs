//! Error types for the custodia PHI audit core.
//!
//! All fallible operations in custodia return `CustodiaResult<T>`.
//! Cryptographic and append failures are never retried inside the core —
//! retry policy belongs to the caller, outside the chain's critical section.

use thiserror::Error;

/// The unified error type for the custodia crates.
#[derive(Debug, Error)]
pub enum CustodiaError {
    /// Authenticated decryption failed: the ciphertext was tampered with or
    /// the referenced key id is unknown to this instance.
    ///
    /// Always fails closed — no unauthenticated plaintext is ever returned.
    /// The message carries a key *id* at most, never key material or plaintext.
    #[error("decryption failed: {reason}")]
    Decryption { reason: String },

    /// The AEAD encrypt operation itself failed.
    ///
    /// With a valid 256-bit key this cannot happen in practice; the variant
    /// exists so the encrypt path never panics.
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },

    /// The audit store could not complete a durable append, or the tail
    /// compare-and-swap was lost to a concurrent writer.
    ///
    /// This is fatal for the action that triggered the audit call — an
    /// unaudited PHI access is a compliance gap, not a warning.
    #[error("audit append failed: {reason}")]
    AppendFailed { reason: String },

    /// Key material or configuration is missing or malformed.
    ///
    /// A startup-time condition: once the registry is built, encrypt and
    /// decrypt never surface this for registered keys.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A value could not be canonically serialized for hashing or encryption.
    #[error("canonical serialization failed: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the custodia crates.
pub type CustodiaResult<T> = Result<T, CustodiaError>;
