//! SQLite-backed key ledger for Keygate.
//!
//! Persists activation key records in a single `keys` table. The consume
//! path is a guarded `UPDATE ... WHERE uses < max_uses`, so the
//! check-then-increment step is atomic at the database level, including
//! across processes sharing the file.
//!
//! Columns are nullable and read with defaults (`uses` 0, `max_uses` 3,
//! `comment` empty) so records written by earlier deployments without those
//! fields stay redeemable.

use keygate_core::{
    ActivationKey, ConsumeOutcome, GateError, GateResult, Ledger, DEFAULT_MAX_USES,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Persistent ledger backed by SQLite.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Opens (or creates) a ledger at the given path.
    pub fn new(path: impl AsRef<Path>) -> GateResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| GateError::Storage(format!("failed to open key ledger: {e}")))?;
        let ledger = Self {
            conn: Mutex::new(conn),
        };
        ledger.init_schema()?;
        info!("Opened key ledger at {}", path.display());
        Ok(ledger)
    }

    /// Opens an in-memory ledger (for testing).
    pub fn open_in_memory() -> GateResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| GateError::Storage(format!("failed to open in-memory ledger: {e}")))?;
        let ledger = Self {
            conn: Mutex::new(conn),
        };
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn init_schema(&self) -> GateResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS keys (
                key TEXT PRIMARY KEY,
                uses INTEGER,
                max_uses INTEGER,
                comment TEXT
            );
            ",
        )
        .map_err(|e| GateError::Storage(format!("failed to init ledger schema: {e}")))?;
        Ok(())
    }
}

impl Ledger for SqliteLedger {
    fn lookup(&self, key: &str) -> GateResult<Option<ActivationKey>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT key, uses, max_uses, comment FROM keys WHERE key = ?1",
            params![key],
            |row| {
                Ok(ActivationKey {
                    key: row.get(0)?,
                    uses: row.get::<_, Option<u32>>(1)?.unwrap_or(0),
                    max_uses: row.get::<_, Option<u32>>(2)?.unwrap_or(DEFAULT_MAX_USES),
                    comment: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            },
        )
        .optional()
        .map_err(|e| GateError::Storage(format!("failed to look up key: {e}")))
    }

    fn consume_use(&self, key: &str) -> GateResult<ConsumeOutcome> {
        let conn = self.conn.lock().unwrap();
        // Guarded increment: applies only while quota remains. COALESCE
        // keeps legacy NULL rows on the defaults.
        let changed = conn
            .execute(
                "UPDATE keys
                 SET uses = COALESCE(uses, 0) + 1
                 WHERE key = ?1 AND COALESCE(uses, 0) < COALESCE(max_uses, ?2)",
                params![key, DEFAULT_MAX_USES],
            )
            .map_err(|e| GateError::Storage(format!("failed to consume use: {e}")))?;
        if changed == 1 {
            return Ok(ConsumeOutcome::Consumed);
        }

        let exists = conn
            .query_row("SELECT 1 FROM keys WHERE key = ?1", params![key], |_| Ok(()))
            .optional()
            .map_err(|e| GateError::Storage(format!("failed to probe key: {e}")))?
            .is_some();
        if exists {
            Ok(ConsumeOutcome::Exhausted)
        } else {
            Ok(ConsumeOutcome::Missing)
        }
    }

    fn create(&self, record: &ActivationKey) -> GateResult<()> {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO keys (key, uses, max_uses, comment) VALUES (?1, ?2, ?3, ?4)",
            params![record.key, record.uses, record.max_uses, record.comment],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(GateError::DuplicateKey(record.key.clone()))
            }
            Err(e) => Err(GateError::Storage(format!("failed to create key: {e}"))),
        }
    }
}
