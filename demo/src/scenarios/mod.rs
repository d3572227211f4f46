//! The four demo scenarios, one module each.

pub mod audit_trail;
pub mod key_rotation;
pub mod phi_encryption;
pub mod tamper_detection;
