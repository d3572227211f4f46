//! Startup-time key loading.
//!
//! Key material is externally supplied — from a secret store, a mounted
//! file, or the environment — and loaded into the registry once at process
//! start. A missing or malformed key is a `Config` error here, never a
//! runtime error during encrypt/decrypt.
//!
//! TOML shape:
//!
//! ```toml
//! current = "key-2026"
//!
//! [keys]
//! key-2026 = "<base64 of 32 key bytes>"
//! key-2025 = "<base64 of 32 key bytes>"
//! ```

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;

use custodia_contracts::{
    blob::KeyId,
    error::{CustodiaError, CustodiaResult},
};

use crate::keys::{KeyMaterial, KeyRegistry, KEY_LEN};

/// Environment variable holding a single base64 key.
pub const ENV_KEY: &str = "CUSTODIA_KEY";

/// Environment variable naming that key's id (optional).
pub const ENV_KEY_ID: &str = "CUSTODIA_KEY_ID";

/// Default key id when only `CUSTODIA_KEY` is set.
const DEFAULT_KEY_ID: &str = "primary";

/// Declarative key-store configuration, deserialized from TOML or read from
/// the environment.
#[derive(Debug, Deserialize)]
pub struct KeyStoreConfig {
    /// The id that becomes current after loading.
    pub current: String,

    /// Key id → base64-encoded 32-byte key. `BTreeMap` keeps file diffs and
    /// debug output stable.
    pub keys: BTreeMap<String, String>,
}

impl KeyStoreConfig {
    /// Parse `s` as TOML key-store configuration.
    pub fn from_toml_str(s: &str) -> CustodiaResult<Self> {
        let config: KeyStoreConfig =
            toml::from_str(s).map_err(|e| CustodiaError::Config {
                reason: format!("failed to parse key store TOML: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML key-store configuration.
    pub fn from_file(path: &Path) -> CustodiaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustodiaError::Config {
            reason: format!("failed to read key file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build a single-key configuration from `CUSTODIA_KEY` (base64) and
    /// `CUSTODIA_KEY_ID` (defaults to `"primary"`).
    pub fn from_env() -> CustodiaResult<Self> {
        let key = env::var(ENV_KEY).map_err(|_| CustodiaError::Config {
            reason: format!("environment variable {} is not set", ENV_KEY),
        })?;
        let id = env::var(ENV_KEY_ID).unwrap_or_else(|_| DEFAULT_KEY_ID.to_string());

        let mut keys = BTreeMap::new();
        keys.insert(id.clone(), key);
        let config = KeyStoreConfig { current: id, keys };
        config.validate()?;
        Ok(config)
    }

    /// Decode every key and load the set into a fresh [`KeyRegistry`], with
    /// `current` designated for new encryptions.
    pub fn into_registry(self) -> CustodiaResult<KeyRegistry> {
        let registry = KeyRegistry::new();
        for (id, encoded) in &self.keys {
            let material = decode_key(id, encoded)?;
            registry.register(KeyId::new(id.clone()), material);
        }
        registry.rotate_to(&KeyId::new(self.current))?;
        Ok(registry)
    }

    fn validate(&self) -> CustodiaResult<()> {
        if self.keys.is_empty() {
            return Err(CustodiaError::Config {
                reason: "key store contains no keys".to_string(),
            });
        }
        if !self.keys.contains_key(&self.current) {
            return Err(CustodiaError::Config {
                reason: format!("current key id '{}' is not in [keys]", self.current),
            });
        }
        Ok(())
    }
}

/// Decode one base64 key, enforcing the AES-256 length.
///
/// Error messages name the key id only — never the (possibly partially
/// valid) material.
fn decode_key(id: &str, encoded: &str) -> CustodiaResult<KeyMaterial> {
    let bytes = BASE64.decode(encoded.trim()).map_err(|_| CustodiaError::Config {
        reason: format!("key '{}' is not valid base64", id),
    })?;
    let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CustodiaError::Config {
        reason: format!("key '{}' must decode to exactly {} bytes", id, KEY_LEN),
    })?;
    Ok(KeyMaterial::from_bytes(bytes))
}
