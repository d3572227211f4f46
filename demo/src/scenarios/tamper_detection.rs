//! Scenario 2: Tamper Detection
//!
//! Builds a chain, then plays the attacker: a copy of the persisted events
//! is rewritten out-of-band (the actor on event 2 changed to hide a lookup).
//! `verify_events` pinpoints the damage at exactly that sequence.

use std::sync::Arc;

use custodia_contracts::{error::CustodiaResult, event::AuditEvent};
use custodia_ledger::{ActionRequest, AuditLedger, InMemoryAuditStore, ScanRange};
use custodia_verify::verify_events;

pub fn run_scenario() -> CustodiaResult<()> {
    println!("── Scenario 2: Tamper Detection ─────────────────────────────");
    println!();

    let ledger = AuditLedger::new(Arc::new(InMemoryAuditStore::new()));
    for i in 0..5 {
        ledger.log_action(
            ActionRequest::new(
                "VIEW_PATIENT_RECORD",
                "dr-smith",
                "Patient",
                format!("patient-{}", 100 + i),
                true,
            )
            .actor_role("doctor"),
        )?;
    }

    // The attacker rewrites stored rows directly, bypassing the ledger API.
    let mut stolen_copy = ledger.store().scan(&ScanRange::all())?;
    stolen_copy[2].actor_id = "dr-nobody".to_string();
    println!("  event 2 actor_id rewritten out-of-band: dr-smith -> dr-nobody");

    let report = verify_events(&stolen_copy, AuditEvent::GENESIS_HASH)?;

    println!();
    println!(
        "  verification: {} events checked, intact = {}",
        report.events_checked,
        report.is_intact()
    );
    for b in &report.breaks {
        println!(
            "    break at #{} ({:?}) event {}",
            b.sequence, b.kind, b.event_id
        );
    }

    // The untouched store still verifies clean.
    let clean = verify_events(
        &ledger.store().scan(&ScanRange::all())?,
        AuditEvent::GENESIS_HASH,
    )?;
    println!("  original store remains intact = {}", clean.is_intact());
    println!();
    Ok(())
}
