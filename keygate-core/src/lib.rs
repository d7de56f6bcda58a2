//! Key ledger and activation gate for Keygate.
//!
//! This crate owns the redemption state machine for activation keys:
//! - `ActivationKey` records carrying a usage quota (`max_uses`, default 3)
//! - The `Ledger` trait: lookup, atomic consume-one-use, insert-if-absent
//! - The `ActivationGate`: validates a caller-supplied key, consumes one use,
//!   and returns the activation payload, or a typed failure
//!
//! # Design Principles
//!
//! - **Injected storage**: the gate receives an explicitly constructed ledger
//!   handle at startup; there is no process-global connection state
//! - **Guarded increment**: a use is consumed by a conditional update that
//!   only applies while `uses < max_uses`, so concurrent redemptions of the
//!   same key can never push it past its quota
//! - **Terminal failures**: every failure is terminal for the request; the
//!   only internal retry is key regeneration on a mint collision

mod error;
mod gate;
mod key;
mod ledger;

pub use error::{GateError, GateResult};
pub use gate::{ActivationGate, MintedKey, PayloadSource};
pub use key::{generate_key, ActivationKey, DEFAULT_MAX_USES};
pub use ledger::{ConsumeOutcome, Ledger, MemoryLedger};
