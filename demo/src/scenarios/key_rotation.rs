//! Scenario 4: Key Rotation
//!
//! Rotates the current key mid-stream. Blobs written before the rotation
//! keep decrypting because they name their key; retiring the old key is the
//! explicit, separate step that finally orphans them.

use custodia_contracts::{blob::KeyId, error::CustodiaResult};
use custodia_crypto::{generate_key, EncryptionService, KeyRegistry};

pub fn run_scenario() -> CustodiaResult<()> {
    println!("── Scenario 4: Key Rotation ─────────────────────────────────");
    println!();

    let registry = KeyRegistry::new();
    registry.register_current(KeyId::new("key-2025"), generate_key());
    let service = EncryptionService::new(registry);

    let old_blob = service.encrypt(b"kept under the 2025 key", None)?;
    println!("  encrypted under current key '{}'", old_blob.key_id);

    service
        .registry()
        .register_current(KeyId::new("key-2026"), generate_key());
    let new_blob = service.encrypt(b"kept under the 2026 key", None)?;
    println!("  rotated; new encryptions use '{}'", new_blob.key_id);

    println!(
        "  pre-rotation blob still decrypts = {}",
        service.decrypt(&old_blob).is_ok()
    );

    service.registry().retire(&KeyId::new("key-2025"))?;
    match service.decrypt(&old_blob) {
        Err(e) => println!("  after retiring 'key-2025': {}", e),
        Ok(_) => println!("  UNEXPECTED: retired-key blob decrypted"),
    }

    println!();
    Ok(())
}
