//! Scenario 1: Audit Trail
//!
//! A clinician reviews a patient chart, a researcher runs a literature
//! search, and an admin exports a report. Each action lands in the ledger as
//! one hash-chained event; the verifier then sweeps the whole chain.

use std::sync::Arc;

use custodia_contracts::error::CustodiaResult;
use custodia_ledger::{ActionRequest, AuditLedger, InMemoryAuditStore, ScanRange};
use custodia_verify::ChainVerifier;

pub fn run_scenario() -> CustodiaResult<()> {
    println!("── Scenario 1: Audit Trail ──────────────────────────────────");
    println!();

    let ledger = AuditLedger::new(Arc::new(InMemoryAuditStore::new()));

    let requests = vec![
        ActionRequest::new("VIEW_PATIENT_RECORD", "dr-smith", "Patient", "patient-123", true)
            .actor_role("doctor")
            .ip_address("10.0.4.17")
            .detail("reason", "pre-surgery review"),
        ActionRequest::new("SEARCH_PAPERS", "researcher-44", "Paper", "query-7781", false)
            .actor_role("researcher")
            .detail("query", "beta blocker interactions"),
        ActionRequest::new("EXPORT_AUDIT_REPORT", "admin-2", "AuditLog", "2026-08", false)
            .actor_role("admin")
            .response_status(200),
    ];

    for req in requests {
        let event = ledger.log_action(req)?;
        println!(
            "  appended #{:<2} {:<22} prev={}… hash={}…",
            event.sequence,
            event.action,
            &event.previous_hash[..12],
            &event.record_hash[..12]
        );
    }

    let verifier = ChainVerifier::new(ledger.store());
    let report = verifier.verify_chain(&ScanRange::all())?;

    println!();
    println!(
        "  verification: {} events checked, intact = {}",
        report.events_checked,
        report.is_intact()
    );
    println!();
    Ok(())
}
