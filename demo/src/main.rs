//! custodia — Demo CLI
//!
//! Runs one or all of the four walkthrough scenarios. Each scenario uses the
//! real custodia components (encryption service, audit ledger, chain
//! verifier) wired over the in-memory audit store.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- audit-trail
//!   cargo run -p demo -- tamper-detection
//!   cargo run -p demo -- phi-encryption
//!   cargo run -p demo -- key-rotation

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod scenarios;

use scenarios::{audit_trail, key_rotation, phi_encryption, tamper_detection};

// ── CLI definition ────────────────────────────────────────────────────────────

/// custodia — tamper-evident audit ledger and PHI encryption demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "custodia audit-ledger and PHI-encryption demo",
    long_about = "Walks through the custodia core: hash-chained audit logging,\n\
                  tamper detection, authenticated PHI encryption, and key rotation."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four scenarios in sequence.
    RunAll,
    /// Scenario 1: sequential PHI accesses building a verifiable chain.
    AuditTrail,
    /// Scenario 2: out-of-band mutation caught by the chain verifier.
    TamperDetection,
    /// Scenario 3: authenticated encryption round trip and failure modes.
    PhiEncryption,
    /// Scenario 4: key rotation without orphaning old ciphertexts.
    KeyRotation,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::AuditTrail => audit_trail::run_scenario(),
        Command::TamperDetection => tamper_detection::run_scenario(),
        Command::PhiEncryption => phi_encryption::run_scenario(),
        Command::KeyRotation => key_rotation::run_scenario(),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all() -> custodia_contracts::error::CustodiaResult<()> {
    audit_trail::run_scenario()?;
    tamper_detection::run_scenario()?;
    phi_encryption::run_scenario()?;
    key_rotation::run_scenario()
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("custodia — Tamper-evident Audit Ledger & PHI Encryption");
    println!("=======================================================");
    println!();
    println!("Per PHI-relevant operation:");
    println!("  [1] PHI at rest is sealed with AES-256-GCM (key-rotation aware)");
    println!("  [2] The access is appended to a SHA-256 hash chain, one event per action");
    println!("  [3] The chain verifier sweeps the store and reports any altered byte");
    println!();
}
