//! # custodia-crypto
//!
//! Authenticated encryption and content hashing for PHI at rest.
//!
//! ## Overview
//!
//! - [`EncryptionService`] — AES-256-GCM encrypt/decrypt of opaque payloads,
//!   plus structured-value convenience wrappers that share the audit chain's
//!   canonical serialization.
//! - [`KeyRegistry`] — key id → material mapping with a designated current
//!   key; rotation-aware, so old blobs stay decryptable until their key is
//!   retired.
//! - [`hash_data`] — keyless SHA-256 fingerprinting, also the hashing
//!   primitive under the audit chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custodia_crypto::{generate_key, EncryptionService, KeyRegistry};
//! use custodia_contracts::blob::KeyId;
//!
//! let registry = KeyRegistry::new();
//! registry.register_current(KeyId::new("key-2026"), generate_key());
//!
//! let service = EncryptionService::new(registry);
//! let blob = service.encrypt(b"patient notes", None)?;
//! let plaintext = service.decrypt(&blob)?;
//! ```

pub mod config;
pub mod keys;
pub mod service;

pub use config::KeyStoreConfig;
pub use keys::{generate_key, KeyMaterial, KeyRegistry};
pub use service::{hash_data, EncryptionService};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use custodia_contracts::{
        blob::KeyId,
        canonical::{DetailValue, Details},
        error::CustodiaError,
    };

    use super::{generate_key, hash_data, EncryptionService, KeyRegistry, KeyStoreConfig};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// A service with one current key under the given id.
    fn make_service(key_id: &str) -> EncryptionService {
        let registry = KeyRegistry::new();
        registry.register_current(KeyId::new(key_id), generate_key());
        EncryptionService::new(registry)
    }

    // ── Round trips ───────────────────────────────────────────────────────────

    #[test]
    fn encrypt_decrypt_round_trips_arbitrary_bytes() {
        let service = make_service("k1");
        let payload: Vec<u8> = (0u8..=255).collect();

        let blob = service.encrypt(&payload, None).unwrap();
        assert_eq!(service.decrypt(&blob).unwrap(), payload);
    }

    #[test]
    fn encrypt_decrypt_round_trips_empty_payload() {
        let service = make_service("k1");

        let blob = service.encrypt(b"", None).unwrap();
        assert_eq!(service.decrypt(&blob).unwrap(), b"");
    }

    #[test]
    fn ciphertext_differs_for_identical_plaintext() {
        // Fresh randomness per call: ciphertext equality must not leak
        // plaintext equality.
        let service = make_service("k1");

        let a = service.encrypt(b"same payload", None).unwrap();
        let b = service.encrypt(b"same payload", None).unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn structured_round_trip_preserves_value() {
        let service = make_service("k1");

        let mut details = Details::new();
        details.insert("reason".to_string(), DetailValue::from("pre-surgery review"));
        details.insert("priority".to_string(), DetailValue::from(2i64));

        let blob = service.encrypt_structured(&details, None).unwrap();
        let decoded: Details = service.decrypt_structured(&blob).unwrap();
        assert_eq!(details, decoded);
    }

    // ── Failure modes ─────────────────────────────────────────────────────────

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let service = make_service("k1");
        let mut blob = service.encrypt(b"sensitive", None).unwrap();

        blob.ciphertext[0] ^= 0x01;

        match service.decrypt(&blob) {
            Err(CustodiaError::Decryption { .. }) => {}
            other => panic!("expected Decryption error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_key_id_fails_decryption() {
        // Encrypt under k1, then present the blob to an instance that only
        // knows k2.
        let producer = make_service("k1");
        let blob = producer.encrypt(b"cross-instance", None).unwrap();

        let consumer = make_service("k2");
        match consumer.decrypt(&blob) {
            Err(CustodiaError::Decryption { reason }) => {
                assert!(reason.contains("k1"), "reason should name the missing id");
            }
            other => panic!("expected Decryption error, got {:?}", other),
        }
    }

    #[test]
    fn error_messages_never_contain_key_material() {
        let registry = KeyRegistry::new();
        let key = generate_key();
        registry.register_current(KeyId::new("k1"), key);
        let service = EncryptionService::new(registry);

        let mut blob = service.encrypt(b"phi", None).unwrap();
        blob.ciphertext.pop();

        let err = service.decrypt(&blob).unwrap_err();
        let msg = err.to_string();
        // The message names the failure class only.
        assert!(msg.contains("decryption failed"));
        assert!(!msg.contains("phi"));
    }

    // ── Rotation and retirement ───────────────────────────────────────────────

    #[test]
    fn rotation_keeps_old_blobs_decryptable() {
        let registry = KeyRegistry::new();
        registry.register_current(KeyId::new("key-2025"), generate_key());
        let service = EncryptionService::new(registry);

        let old_blob = service.encrypt(b"before rotation", None).unwrap();

        service
            .registry()
            .register_current(KeyId::new("key-2026"), generate_key());
        let new_blob = service.encrypt(b"after rotation", None).unwrap();

        assert_eq!(new_blob.key_id, KeyId::new("key-2026"));
        assert_eq!(service.decrypt(&old_blob).unwrap(), b"before rotation");
        assert_eq!(service.decrypt(&new_blob).unwrap(), b"after rotation");
    }

    #[test]
    fn retiring_a_key_orphans_its_blobs() {
        let registry = KeyRegistry::new();
        registry.register_current(KeyId::new("key-2025"), generate_key());
        let service = EncryptionService::new(registry);

        let blob = service.encrypt(b"old data", None).unwrap();

        service
            .registry()
            .register_current(KeyId::new("key-2026"), generate_key());
        service.registry().retire(&KeyId::new("key-2025")).unwrap();

        assert!(matches!(
            service.decrypt(&blob),
            Err(CustodiaError::Decryption { .. })
        ));
    }

    #[test]
    fn current_key_cannot_be_retired() {
        let registry = KeyRegistry::new();
        registry.register_current(KeyId::new("only"), generate_key());

        assert!(matches!(
            registry.retire(&KeyId::new("only")),
            Err(CustodiaError::Config { .. })
        ));
    }

    #[test]
    fn explicit_key_id_overrides_current() {
        let registry = KeyRegistry::new();
        registry.register(KeyId::new("aux"), generate_key());
        registry.register_current(KeyId::new("main"), generate_key());
        let service = EncryptionService::new(registry);

        let blob = service.encrypt(b"x", Some(&KeyId::new("aux"))).unwrap();
        assert_eq!(blob.key_id, KeyId::new("aux"));
        assert_eq!(service.decrypt(&blob).unwrap(), b"x");
    }

    // ── Hashing ───────────────────────────────────────────────────────────────

    #[test]
    fn hash_data_matches_known_sha256_vectors() {
        // Fixed vectors pin cross-process stability.
        assert_eq!(
            hash_data(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash_data(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn hash_data_is_stable_across_calls() {
        let payload = b"patient-123 chart";
        assert_eq!(hash_data(payload), hash_data(payload));
    }

    // ── Key generation ────────────────────────────────────────────────────────

    #[test]
    fn generated_keys_are_independent() {
        let registry = KeyRegistry::new();
        registry.register_current(KeyId::new("a"), generate_key());

        let other = KeyRegistry::new();
        other.register_current(KeyId::new("a"), generate_key());

        // Same key id, different material: a blob from one instance must not
        // decrypt on the other.
        let service_a = EncryptionService::new(registry);
        let service_b = EncryptionService::new(other);

        let blob = service_a.encrypt(b"secret", None).unwrap();
        assert!(service_b.decrypt(&blob).is_err());
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn key_store_config_builds_registry() {
        // 32 zero bytes, base64-encoded.
        let toml = r#"
current = "key-2026"

[keys]
key-2026 = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
"#;
        let config = KeyStoreConfig::from_toml_str(toml).unwrap();
        let registry = config.into_registry().unwrap();

        assert_eq!(registry.current_id(), Some(KeyId::new("key-2026")));
        assert!(registry.contains(&KeyId::new("key-2026")));
    }

    #[test]
    fn config_rejects_unknown_current_id() {
        let toml = r#"
current = "missing"

[keys]
other = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
"#;
        assert!(matches!(
            KeyStoreConfig::from_toml_str(toml),
            Err(CustodiaError::Config { .. })
        ));
    }

    #[test]
    fn config_rejects_wrong_length_key() {
        let toml = r#"
current = "short"

[keys]
short = "AAAA"
"#;
        let config = KeyStoreConfig::from_toml_str(toml).unwrap();
        assert!(matches!(
            config.into_registry(),
            Err(CustodiaError::Config { .. })
        ));
    }

    #[test]
    fn config_rejects_invalid_base64() {
        let toml = r#"
current = "bad"

[keys]
bad = "not!!base64"
"#;
        let config = KeyStoreConfig::from_toml_str(toml).unwrap();
        assert!(matches!(
            config.into_registry(),
            Err(CustodiaError::Config { .. })
        ));
    }
}
