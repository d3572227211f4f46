//! Scenario 3: PHI Encryption
//!
//! Seals a clinical note with AES-256-GCM, shows the round trip, the
//! tamper-fails-closed property, and SHA-256 fingerprinting — audit
//! evidence of content without storing the content.

use custodia_contracts::{blob::KeyId, canonical::Details, error::CustodiaResult};
use custodia_crypto::{generate_key, hash_data, EncryptionService, KeyRegistry};

pub fn run_scenario() -> CustodiaResult<()> {
    println!("── Scenario 3: PHI Encryption ───────────────────────────────");
    println!();

    let registry = KeyRegistry::new();
    registry.register_current(KeyId::new("key-2026"), generate_key());
    let service = EncryptionService::new(registry);

    let note = b"Patient patient-123: cleared for surgery, monitor INR daily.";
    println!("  plaintext fingerprint: {}…", &hash_data(note)[..16]);

    let blob = service.encrypt(note, None)?;
    println!(
        "  sealed under '{}': {} ciphertext bytes, nonce {}",
        blob.key_id,
        blob.ciphertext.len(),
        hex_preview(&blob.nonce)
    );

    let recovered = service.decrypt(&blob)?;
    println!(
        "  decrypt round trip ok = {}, fingerprint matches = {}",
        recovered == note,
        hash_data(&recovered) == hash_data(note)
    );

    // One flipped bit: authentication fails, nothing comes back.
    let mut corrupted = blob.clone();
    corrupted.ciphertext[0] ^= 0x01;
    match service.decrypt(&corrupted) {
        Err(e) => println!("  tampered blob rejected: {}", e),
        Ok(_) => println!("  UNEXPECTED: tampered blob decrypted"),
    }

    // Structured values go through the same canonical form as the chain.
    let mut record = Details::new();
    record.insert("diagnosis".to_string(), "atrial fibrillation".into());
    record.insert("inr_target".to_string(), 2.5f64.into());
    let structured = service.encrypt_structured(&record, None)?;
    let decoded: Details = service.decrypt_structured(&structured)?;
    println!("  structured round trip ok = {}", decoded == record);

    println!();
    Ok(())
}

fn hex_preview(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
