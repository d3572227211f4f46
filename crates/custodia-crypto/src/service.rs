//! The encryption service: AES-256-GCM for PHI at rest, SHA-256 for
//! content fingerprinting.
//!
//! Encryption and decryption are stateless with respect to the ledger and
//! run with unbounded parallelism; only registry lookups take the
//! read-mostly lock.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use custodia_contracts::{
    blob::{EncryptedBlob, KeyId},
    canonical,
    error::{CustodiaError, CustodiaResult},
};

use crate::config::KeyStoreConfig;
use crate::keys::{KeyMaterial, KeyRegistry};

/// AES-GCM nonce size (96 bits).
const NONCE_LEN: usize = 12;

/// One-way, deterministic SHA-256 digest of `data` as lowercase hex.
///
/// Pure and keyless: used for PHI fingerprinting (audit evidence without
/// storing raw PHI) and as the hashing primitive under the audit chain.
/// Stable across calls and across process restarts.
pub fn hash_data(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Confidentiality and integrity for PHI payloads at rest.
///
/// Owns the [`KeyRegistry`]; every blob it produces names the key it was
/// encrypted under, so rotation does not orphan old ciphertexts.
pub struct EncryptionService {
    registry: KeyRegistry,
}

impl EncryptionService {
    /// Wrap an already-populated registry.
    pub fn new(registry: KeyRegistry) -> Self {
        Self { registry }
    }

    /// Load keys from configuration and build the service.
    pub fn from_config(config: KeyStoreConfig) -> CustodiaResult<Self> {
        Ok(Self::new(config.into_registry()?))
    }

    /// Access the registry, e.g. to rotate or retire keys at runtime.
    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Encrypt `plaintext` under `key_id`, or under the current key when
    /// unspecified.
    ///
    /// Empty and non-text binary payloads are valid. A fresh random nonce is
    /// drawn per call, so identical plaintexts produce distinct ciphertexts
    /// and ciphertext equality leaks nothing about plaintext equality.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        key_id: Option<&KeyId>,
    ) -> CustodiaResult<EncryptedBlob> {
        let key_id = match key_id {
            Some(id) => id.clone(),
            None => self.registry.current_id().ok_or_else(|| CustodiaError::Config {
                reason: "no current encryption key is designated".to_string(),
            })?,
        };
        let key = self.resolve(&key_id)?;

        let cipher = cipher_for(&key)?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CustodiaError::Encryption {
                reason: "AEAD encryption failed".to_string(),
            })?;

        debug!(key_id = %key_id, plaintext_len = plaintext.len(), "payload encrypted");

        Ok(EncryptedBlob {
            key_id,
            nonce: nonce_bytes.to_vec(),
            ciphertext,
        })
    }

    /// Decrypt `blob`, authenticating it in the process.
    ///
    /// Fails with `Decryption` when the key id is unknown to this instance
    /// or the authentication check fails; partially decrypted or
    /// unauthenticated plaintext is never returned.
    pub fn decrypt(&self, blob: &EncryptedBlob) -> CustodiaResult<Vec<u8>> {
        let key = self.resolve(&blob.key_id)?;

        if blob.nonce.len() != NONCE_LEN {
            warn!(key_id = %blob.key_id, "blob rejected: malformed nonce");
            return Err(CustodiaError::Decryption {
                reason: format!("nonce must be {} bytes", NONCE_LEN),
            });
        }

        let cipher = cipher_for(&key)?;
        let nonce = Nonce::from_slice(&blob.nonce);

        cipher
            .decrypt(nonce, blob.ciphertext.as_slice())
            .map_err(|_| {
                warn!(key_id = %blob.key_id, "blob rejected: authentication failed");
                CustodiaError::Decryption {
                    reason: "ciphertext failed authentication".to_string(),
                }
            })
    }

    /// Canonically serialize `value`, then encrypt the bytes.
    ///
    /// Uses the same canonicalization as the audit chain's hashing path, so
    /// a fingerprint taken before encryption matches one recomputed after a
    /// decrypt round trip.
    pub fn encrypt_structured<T: Serialize>(
        &self,
        value: &T,
        key_id: Option<&KeyId>,
    ) -> CustodiaResult<EncryptedBlob> {
        let bytes = canonical::to_canonical_vec(value)?;
        self.encrypt(&bytes, key_id)
    }

    /// Decrypt `blob` and reconstruct the structured value.
    pub fn decrypt_structured<T: DeserializeOwned>(
        &self,
        blob: &EncryptedBlob,
    ) -> CustodiaResult<T> {
        let bytes = self.decrypt(blob)?;
        serde_json::from_slice(&bytes).map_err(|e| CustodiaError::Serialization {
            reason: format!("decrypted payload is not the expected shape: {}", e),
        })
    }

    fn resolve(&self, id: &KeyId) -> CustodiaResult<KeyMaterial> {
        self.registry.lookup(id).ok_or_else(|| {
            warn!(key_id = %id, "key id not registered with this instance");
            CustodiaError::Decryption {
                reason: format!("unknown key id '{}'", id),
            }
        })
    }
}

/// Build the AES-256-GCM cipher for one key.
fn cipher_for(key: &KeyMaterial) -> CustodiaResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CustodiaError::Encryption {
        reason: "invalid key length for AES-256-GCM".to_string(),
    })
}
