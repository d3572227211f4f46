//! # custodia-verify
//!
//! Read-only tamper detection over the custodia audit chain.
//!
//! [`ChainVerifier`] scans a stored ledger range, recomputes every event's
//! record hash, and checks every previous-hash link. Violations come back as
//! a [`VerificationReport`] — data for operator review, never an error.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custodia_ledger::ScanRange;
//! use custodia_verify::ChainVerifier;
//!
//! let verifier = ChainVerifier::new(ledger.store());
//! let report = verifier.verify_chain(&ScanRange::all())?;
//! assert!(report.is_intact());
//! ```

pub mod verifier;

pub use verifier::{verify_events, BreakKind, ChainBreak, ChainVerifier, VerificationReport};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use custodia_contracts::{
        error::CustodiaResult,
        event::AuditEvent,
    };
    use custodia_ledger::{
        ActionRequest, AuditLedger, AuditStore, InMemoryAuditStore, ScanRange,
    };

    use super::{verify_events, BreakKind, ChainVerifier};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// A ledger pre-loaded with `n` chained events.
    fn seeded_ledger(n: usize) -> AuditLedger {
        let ledger = AuditLedger::new(Arc::new(InMemoryAuditStore::new()));
        for i in 0..n {
            ledger
                .log_action(
                    ActionRequest::new(
                        "VIEW_PATIENT_RECORD",
                        "dr-smith",
                        "Patient",
                        format!("patient-{}", i),
                        true,
                    )
                    .detail("reason", "pre-surgery review"),
                )
                .unwrap();
        }
        ledger
    }

    /// An `AuditStore` that serves tampered copies of another store's
    /// events — persisted storage an attacker rewrote out-of-band.
    struct TamperedStore {
        inner: Arc<dyn AuditStore>,
        tampered: Mutex<Vec<AuditEvent>>,
    }

    impl TamperedStore {
        fn new(inner: Arc<dyn AuditStore>, mutate: impl FnOnce(&mut Vec<AuditEvent>)) -> Self {
            let mut events = inner.scan(&ScanRange::all()).unwrap();
            mutate(&mut events);
            Self {
                inner,
                tampered: Mutex::new(events),
            }
        }
    }

    impl AuditStore for TamperedStore {
        fn append(&self, event: AuditEvent, expected_tail: &str) -> CustodiaResult<u64> {
            self.inner.append(event, expected_tail)
        }

        fn tail_hash(&self) -> CustodiaResult<String> {
            self.inner.tail_hash()
        }

        fn scan(&self, range: &ScanRange) -> CustodiaResult<Vec<AuditEvent>> {
            let events = self.tampered.lock().unwrap();
            Ok(events.iter().filter(|e| range.contains(e)).cloned().collect())
        }

        fn event_count(&self) -> CustodiaResult<u64> {
            Ok(self.tampered.lock().unwrap().len() as u64)
        }
    }

    // ── Intact chains ─────────────────────────────────────────────────────────

    #[test]
    fn sequential_chain_verifies_intact() {
        let ledger = seeded_ledger(10);
        let verifier = ChainVerifier::new(ledger.store());

        let report = verifier.verify_chain(&ScanRange::all()).unwrap();
        assert!(report.is_intact());
        assert_eq!(report.events_checked, 10);
    }

    #[test]
    fn empty_range_is_trivially_intact() {
        let ledger = seeded_ledger(0);
        let verifier = ChainVerifier::new(ledger.store());

        let report = verifier.verify_chain(&ScanRange::all()).unwrap();
        assert!(report.is_intact());
        assert_eq!(report.events_checked, 0);
    }

    #[test]
    fn mid_chain_range_seeds_link_from_predecessor() {
        let ledger = seeded_ledger(8);
        let verifier = ChainVerifier::new(ledger.store());

        // A range that starts at sequence 3: the verifier must fetch event 2
        // and check event 3's link against its record hash, not genesis.
        let report = verifier.verify_chain(&ScanRange::sequence(3, 7)).unwrap();
        assert!(report.is_intact());
        assert_eq!(report.events_checked, 4);
    }

    // ── Tamper detection ──────────────────────────────────────────────────────

    #[test]
    fn field_mutation_breaks_at_that_event_only() {
        let ledger = seeded_ledger(6);
        let store = Arc::new(TamperedStore::new(ledger.store(), |events| {
            events[3].actor_id = "intruder".to_string();
        }));

        let report = ChainVerifier::new(store).verify_chain(&ScanRange::all()).unwrap();

        assert!(!report.is_intact());
        let first = report.first_break().unwrap();
        assert_eq!(first.sequence, 3, "no break may be reported before the mutation");
        assert_eq!(first.kind, BreakKind::RecordHashMismatch);
        // Event 4 still links to event 3's stored record hash, so the damage
        // does not cascade.
        assert_eq!(report.breaks.len(), 1);
    }

    #[test]
    fn rehashed_mutation_surfaces_as_link_mismatch_downstream() {
        // An attacker who also recomputes the mutated event's record_hash
        // defeats rule 1 but not rule 2: the successor's stored link no
        // longer matches.
        let ledger = seeded_ledger(5);
        let store = Arc::new(TamperedStore::new(ledger.store(), |events| {
            events[2].resource_id = "patient-999".to_string();
            events[2].record_hash = custodia_ledger::hash_event(&events[2]).unwrap();
        }));

        let report = ChainVerifier::new(store).verify_chain(&ScanRange::all()).unwrap();

        assert!(!report.is_intact());
        let first = report.first_break().unwrap();
        assert_eq!(first.sequence, 3);
        assert_eq!(first.kind, BreakKind::LinkMismatch);
    }

    #[test]
    fn removed_event_surfaces_as_link_mismatch() {
        let ledger = seeded_ledger(5);
        let store = Arc::new(TamperedStore::new(ledger.store(), |events| {
            events.remove(2);
        }));

        let report = ChainVerifier::new(store).verify_chain(&ScanRange::all()).unwrap();

        assert!(!report.is_intact());
        assert_eq!(report.first_break().unwrap().sequence, 3);
        assert_eq!(report.first_break().unwrap().kind, BreakKind::LinkMismatch);
    }

    #[test]
    fn forged_genesis_link_is_detected() {
        let ledger = seeded_ledger(3);
        let store = Arc::new(TamperedStore::new(ledger.store(), |events| {
            events[0].previous_hash = format!("f{}", &AuditEvent::GENESIS_HASH[1..]);
        }));

        let report = ChainVerifier::new(store).verify_chain(&ScanRange::all()).unwrap();

        assert!(!report.is_intact());
        // Both rules fire at sequence 0: the link is wrong AND the stored
        // record hash no longer matches (previous_hash is part of the hash
        // input).
        assert_eq!(report.first_break().unwrap().sequence, 0);
    }

    // ── verify_events directly ────────────────────────────────────────────────

    #[test]
    fn verify_events_reports_all_breaks_in_order() {
        let ledger = seeded_ledger(6);
        let mut events = ledger.store().scan(&ScanRange::all()).unwrap();
        events[1].action = "DELETE_PATIENT_RECORD".to_string();
        events[4].phi_accessed = false;

        let report = verify_events(&events, AuditEvent::GENESIS_HASH).unwrap();

        let broken: Vec<u64> = report.breaks.iter().map(|b| b.sequence).collect();
        assert_eq!(broken, vec![1, 4]);
    }

    #[test]
    fn verification_does_not_mutate_the_store() {
        let ledger = seeded_ledger(4);
        let before = ledger.store().scan(&ScanRange::all()).unwrap();

        let verifier = ChainVerifier::new(ledger.store());
        verifier.verify_chain(&ScanRange::all()).unwrap();
        verifier.verify_chain(&ScanRange::sequence(1, 3)).unwrap();

        let after = ledger.store().scan(&ScanRange::all()).unwrap();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.record_hash, b.record_hash);
        }
    }

    #[test]
    fn verification_runs_concurrently_with_appends() {
        use std::thread;

        let ledger = Arc::new(seeded_ledger(10));
        let verifier = ChainVerifier::new(ledger.store());

        let writer = {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for i in 0..50 {
                    ledger
                        .log_action(ActionRequest::new(
                            "SEARCH_PAPERS",
                            "researcher-1",
                            "Paper",
                            format!("paper-{}", i),
                            false,
                        ))
                        .unwrap();
                }
            })
        };

        // Each sweep sees a consistent snapshot regardless of interleaving.
        for _ in 0..20 {
            let report = verifier.verify_chain(&ScanRange::all()).unwrap();
            assert!(report.is_intact());
        }

        writer.join().unwrap();
        let report = verifier.verify_chain(&ScanRange::all()).unwrap();
        assert!(report.is_intact());
        assert_eq!(report.events_checked, 60);
    }
}
