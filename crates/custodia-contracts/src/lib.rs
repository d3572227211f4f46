//! # custodia-contracts
//!
//! Shared types, errors, and the canonical-serialization contract for the
//! custodia PHI audit core.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, error types, and the one function
//! (`canonical::to_canonical_vec`) whose byte output every other component
//! must agree on.

pub mod blob;
pub mod canonical;
pub mod error;
pub mod event;
