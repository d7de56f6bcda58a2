//! The key ledger: authoritative store and sole mutator of activation keys.

use crate::error::{GateError, GateResult};
use crate::key::ActivationKey;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

/// Outcome of an atomic consume-one-use attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Quota remained and one use was consumed.
    Consumed,
    /// The key exists but its quota is exhausted. No mutation.
    Exhausted,
    /// The key does not exist. No mutation.
    Missing,
}

/// Authoritative store for activation key records.
///
/// Implementations must make `consume_use` atomic per key: the increment
/// applies only while `uses < max_uses`, and concurrent callers observe a
/// single consistent sequence of `uses` values with no lost updates. A plain
/// read-then-write is not an acceptable implementation.
pub trait Ledger: Send + Sync {
    /// Looks up a record. Absence is a normal outcome, not an error.
    fn lookup(&self, key: &str) -> GateResult<Option<ActivationKey>>;

    /// Atomically consumes one use if quota remains.
    fn consume_use(&self, key: &str) -> GateResult<ConsumeOutcome>;

    /// Inserts a new record, failing with [`GateError::DuplicateKey`] if the
    /// key already exists.
    fn create(&self, record: &ActivationKey) -> GateResult<()>;
}

/// In-memory ledger.
///
/// Backs the test suites and makes the gate usable without a database file;
/// the guarded increment runs under the write lock.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<HashMap<String, ActivationKey>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for MemoryLedger {
    fn lookup(&self, key: &str) -> GateResult<Option<ActivationKey>> {
        let records = self.records.read().unwrap();
        Ok(records.get(key).cloned())
    }

    fn consume_use(&self, key: &str) -> GateResult<ConsumeOutcome> {
        let mut records = self.records.write().unwrap();
        match records.get_mut(key) {
            None => Ok(ConsumeOutcome::Missing),
            Some(record) if record.is_exhausted() => Ok(ConsumeOutcome::Exhausted),
            Some(record) => {
                record.uses += 1;
                Ok(ConsumeOutcome::Consumed)
            }
        }
    }

    fn create(&self, record: &ActivationKey) -> GateResult<()> {
        let mut records = self.records.write().unwrap();
        match records.entry(record.key.clone()) {
            Entry::Occupied(_) => Err(GateError::DuplicateKey(record.key.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }
}
