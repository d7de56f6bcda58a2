//! Error types for the activation gate.

use thiserror::Error;

/// Activation-gate errors.
#[derive(Debug, Error)]
pub enum GateError {
    /// Key absent from the ledger.
    #[error("activation key not found")]
    KeyNotFound,

    /// Key found but its usage quota is exhausted. No state was mutated.
    #[error("activation key has reached its usage limit")]
    QuotaExceeded,

    /// The activation script could not be retrieved. The use consumed for
    /// this request stays consumed.
    #[error("activation script unavailable: {0}")]
    PayloadUnavailable(String),

    /// A minted key collided with an existing record.
    #[error("activation key already exists: {0}")]
    DuplicateKey(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;
