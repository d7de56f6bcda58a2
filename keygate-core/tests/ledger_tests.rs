use keygate_core::{ActivationKey, ConsumeOutcome, GateError, Ledger, MemoryLedger};
use std::sync::Arc;
use std::thread;

fn record(key: &str, uses: u32, max_uses: u32) -> ActivationKey {
    ActivationKey {
        key: key.to_string(),
        uses,
        max_uses,
        comment: String::new(),
    }
}

// ── Create / lookup ──────────────────────────────────────────────

#[test]
fn create_then_lookup() {
    let ledger = MemoryLedger::new();
    ledger.create(&record("ABCD-EF12-3456", 0, 3)).unwrap();

    let found = ledger.lookup("ABCD-EF12-3456").unwrap().unwrap();
    assert_eq!(found, record("ABCD-EF12-3456", 0, 3));
}

#[test]
fn lookup_missing_is_none() {
    let ledger = MemoryLedger::new();
    assert!(ledger.lookup("ZZZZ-ZZZZ-ZZZZ").unwrap().is_none());
}

#[test]
fn duplicate_create_rejected() {
    let ledger = MemoryLedger::new();
    ledger.create(&record("ABCD-EF12-3456", 0, 3)).unwrap();

    let err = ledger.create(&record("ABCD-EF12-3456", 0, 3)).unwrap_err();
    assert!(matches!(err, GateError::DuplicateKey(k) if k == "ABCD-EF12-3456"));
}

// ── Consume ──────────────────────────────────────────────────────

#[test]
fn consume_walks_quota_to_exhaustion() {
    let ledger = MemoryLedger::new();
    ledger.create(&record("AAAA-BBBB-CCCC", 0, 3)).unwrap();

    for expected in 1..=3 {
        assert_eq!(
            ledger.consume_use("AAAA-BBBB-CCCC").unwrap(),
            ConsumeOutcome::Consumed
        );
        let found = ledger.lookup("AAAA-BBBB-CCCC").unwrap().unwrap();
        assert_eq!(found.uses, expected);
    }

    assert_eq!(
        ledger.consume_use("AAAA-BBBB-CCCC").unwrap(),
        ConsumeOutcome::Exhausted
    );
    let found = ledger.lookup("AAAA-BBBB-CCCC").unwrap().unwrap();
    assert_eq!(found.uses, 3);
}

#[test]
fn consume_missing_key() {
    let ledger = MemoryLedger::new();
    assert_eq!(
        ledger.consume_use("ZZZZ-ZZZZ-ZZZZ").unwrap(),
        ConsumeOutcome::Missing
    );
}

#[test]
fn exhausted_consume_does_not_mutate() {
    let ledger = MemoryLedger::new();
    ledger.create(&record("AAAA-BBBB-CCCC", 3, 3)).unwrap();

    assert_eq!(
        ledger.consume_use("AAAA-BBBB-CCCC").unwrap(),
        ConsumeOutcome::Exhausted
    );
    assert_eq!(ledger.lookup("AAAA-BBBB-CCCC").unwrap().unwrap().uses, 3);
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_consumes_never_over_redeem() {
    let ledger = Arc::new(MemoryLedger::new());
    ledger.create(&record("AAAA-BBBB-CCCC", 0, 3)).unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.consume_use("AAAA-BBBB-CCCC").unwrap())
        })
        .collect();

    let outcomes: Vec<ConsumeOutcome> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let consumed = outcomes
        .iter()
        .filter(|o| **o == ConsumeOutcome::Consumed)
        .count();
    let exhausted = outcomes
        .iter()
        .filter(|o| **o == ConsumeOutcome::Exhausted)
        .count();
    assert_eq!(consumed, 3);
    assert_eq!(exhausted, 13);
    assert_eq!(ledger.lookup("AAAA-BBBB-CCCC").unwrap().unwrap().uses, 3);
}
