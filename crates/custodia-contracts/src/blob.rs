//! Ciphertext container and key identifier types.
//!
//! An `EncryptedBlob` is self-describing: it carries the id of the key it
//! was encrypted under and the nonce the AEAD needs, so a blob written
//! before a key rotation still decrypts afterwards as long as the registry
//! retains the superseded key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for one entry in the key registry.
///
/// Appears in blobs and error messages; never the key material itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(pub String);

impl KeyId {
    /// Create a key id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated ciphertext plus the metadata needed to decrypt it.
///
/// A blob decrypts to its original plaintext if and only if it was produced
/// by the encryption service with a key still known to the decrypting
/// instance and no byte has been altered since — tampering makes decryption
/// fail, never yields silently wrong plaintext.
///
/// Byte fields serialize as lowercase hex strings so blobs survive any
/// JSON-carrying transport unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// The registry key this blob was encrypted under.
    pub key_id: KeyId,

    /// The 96-bit AEAD nonce, fresh per encryption.
    #[serde(with = "hex_bytes")]
    pub nonce: Vec<u8>,

    /// Ciphertext including the authentication tag.
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
}

/// Serde adapter encoding `Vec<u8>` as a lowercase hex string.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
