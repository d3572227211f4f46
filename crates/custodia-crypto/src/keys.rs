//! Key material and the key registry.
//!
//! The registry maps key ids to AES-256 key material and designates one id
//! as "current" for new encryptions. Keys are added at startup or rotation
//! time, never mutated, and optionally retired once no unexpired ciphertext
//! references them. Lookups vastly outnumber changes, so the state sits
//! behind a read-mostly `RwLock`.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use rand::RngCore;

use custodia_contracts::{
    blob::KeyId,
    error::{CustodiaError, CustodiaResult},
};

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// 256 bits of symmetric key material.
///
/// `Debug` is redacted and there is no `Serialize` impl — key bytes must
/// never reach logs, error messages, or the hashing path.
#[derive(Clone)]
pub struct KeyMaterial([u8; KEY_LEN]);

impl KeyMaterial {
    /// Wrap raw key bytes. The caller is responsible for their provenance.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw key bytes for cipher construction.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// Generate fresh, cryptographically random key material.
///
/// Side-effect-free; every call draws independent bytes from the OS-seeded
/// thread RNG.
pub fn generate_key() -> KeyMaterial {
    let mut bytes = [0u8; KEY_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    KeyMaterial(bytes)
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The mutable interior of a [`KeyRegistry`].
struct RegistryState {
    keys: HashMap<KeyId, KeyMaterial>,
    current: Option<KeyId>,
}

/// Mapping from key id to key material, with one id designated current.
///
/// Rotation never invalidates older ciphertexts: a superseded key stays
/// resolvable until it is explicitly retired.
pub struct KeyRegistry {
    state: RwLock<RegistryState>,
}

impl KeyRegistry {
    /// Create an empty registry with no current key.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                keys: HashMap::new(),
                current: None,
            }),
        }
    }

    /// Add a key under `id` without changing the current designation.
    ///
    /// Registering an id twice replaces the previous material; ids for keys
    /// in active use should never be reused.
    pub fn register(&self, id: KeyId, key: KeyMaterial) {
        let mut state = self.state.write().expect("key registry lock poisoned");
        state.keys.insert(id, key);
    }

    /// Add a key under `id` and make it the current key for new encryptions.
    pub fn register_current(&self, id: KeyId, key: KeyMaterial) {
        let mut state = self.state.write().expect("key registry lock poisoned");
        state.keys.insert(id.clone(), key);
        state.current = Some(id);
    }

    /// Make an already-registered key the current one.
    ///
    /// The superseded key remains registered, so blobs encrypted under it
    /// keep decrypting.
    pub fn rotate_to(&self, id: &KeyId) -> CustodiaResult<()> {
        let mut state = self.state.write().expect("key registry lock poisoned");
        if !state.keys.contains_key(id) {
            return Err(CustodiaError::Config {
                reason: format!("cannot rotate to unregistered key id '{}'", id),
            });
        }
        state.current = Some(id.clone());
        Ok(())
    }

    /// Remove a retired key from the registry.
    ///
    /// The current key cannot be retired; rotate away from it first. Blobs
    /// encrypted under a retired key become undecryptable by this instance.
    pub fn retire(&self, id: &KeyId) -> CustodiaResult<()> {
        let mut state = self.state.write().expect("key registry lock poisoned");
        if state.current.as_ref() == Some(id) {
            return Err(CustodiaError::Config {
                reason: format!("cannot retire current key id '{}'", id),
            });
        }
        if state.keys.remove(id).is_none() {
            return Err(CustodiaError::Config {
                reason: format!("cannot retire unknown key id '{}'", id),
            });
        }
        Ok(())
    }

    /// The id new encryptions default to, if one has been designated.
    pub fn current_id(&self) -> Option<KeyId> {
        let state = self.state.read().expect("key registry lock poisoned");
        state.current.clone()
    }

    /// True when `id` resolves to registered key material.
    pub fn contains(&self, id: &KeyId) -> bool {
        let state = self.state.read().expect("key registry lock poisoned");
        state.keys.contains_key(id)
    }

    /// Resolve `id` to its key material, if registered.
    pub(crate) fn lookup(&self, id: &KeyId) -> Option<KeyMaterial> {
        let state = self.state.read().expect("key registry lock poisoned");
        state.keys.get(id).cloned()
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
