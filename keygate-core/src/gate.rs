//! The activation gate: redemption state machine and key issuance.

use crate::error::{GateError, GateResult};
use crate::key::{generate_key, ActivationKey};
use crate::ledger::{ConsumeOutcome, Ledger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Generation attempts before a mint collision is surfaced to the caller.
const MINT_ATTEMPTS: usize = 5;

/// Source of the activation script returned on successful redemption.
///
/// The gate treats retrieval as a simple fallible lookup; the content is
/// opaque and returned verbatim. Failures are reported as
/// [`GateError::PayloadUnavailable`].
pub trait PayloadSource: Send + Sync {
    /// Fetches the current payload text.
    fn fetch(&self) -> GateResult<String>;
}

/// A freshly minted key, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedKey {
    /// The generated key string.
    pub key: String,
    /// The caller-supplied comment stored with it.
    pub comment: String,
}

/// Orchestrates one validation request: look up the key, enforce the quota,
/// consume a use, and return the payload, or a typed failure. Also issues
/// new keys.
pub struct ActivationGate {
    ledger: Arc<dyn Ledger>,
    payload: Arc<dyn PayloadSource>,
}

impl ActivationGate {
    /// Creates a gate over an injected ledger and payload source.
    pub fn new(ledger: Arc<dyn Ledger>, payload: Arc<dyn PayloadSource>) -> Self {
        Self { ledger, payload }
    }

    /// Redeems one use of `key` and returns the activation script.
    ///
    /// Quota enforcement is atomic per key: concurrent redemptions of a key
    /// with one remaining use cannot both succeed. A payload fetch failure
    /// after the increment leaves the use consumed; the caller sees
    /// [`GateError::PayloadUnavailable`] and a retry costs a fresh use.
    pub fn validate(&self, key: &str) -> GateResult<String> {
        info!("Checking key in ledger: {}", key);
        let record = match self.ledger.lookup(key)? {
            Some(record) => record,
            None => {
                warn!("Key not in ledger: {}", key);
                return Err(GateError::KeyNotFound);
            }
        };

        if record.is_exhausted() {
            warn!("Key has reached maximum usage limit: {}", key);
            return Err(GateError::QuotaExceeded);
        }

        // The lookup above is advisory; the ledger's guarded increment is
        // what actually enforces the quota under concurrent redemptions.
        match self.ledger.consume_use(key)? {
            ConsumeOutcome::Consumed => {
                info!("Consumed one use of key: {}", key);
            }
            ConsumeOutcome::Exhausted => {
                warn!("Key has reached maximum usage limit: {}", key);
                return Err(GateError::QuotaExceeded);
            }
            ConsumeOutcome::Missing => {
                warn!("Key not in ledger: {}", key);
                return Err(GateError::KeyNotFound);
            }
        }

        match self.payload.fetch() {
            Ok(script) => Ok(script),
            Err(e) => {
                error!("Activation script could not be retrieved: {}", e);
                Err(e)
            }
        }
    }

    /// Mints a fresh key with the default quota and stores it with the given
    /// comment, regenerating on the (unlikely) collision with an existing
    /// record.
    pub fn mint(&self, comment: &str) -> GateResult<MintedKey> {
        let mut last_collision = String::new();
        for _ in 0..MINT_ATTEMPTS {
            let record = ActivationKey::new(generate_key(), comment);
            match self.ledger.create(&record) {
                Ok(()) => {
                    info!("Minted new key: {}", record.key);
                    return Ok(MintedKey {
                        key: record.key,
                        comment: record.comment,
                    });
                }
                Err(GateError::DuplicateKey(key)) => {
                    warn!("Generated key collided with an existing record: {}", key);
                    last_collision = key;
                }
                Err(e) => return Err(e),
            }
        }
        Err(GateError::DuplicateKey(last_collision))
    }
}
