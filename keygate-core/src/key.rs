//! Activation key records and key generation.
//!
//! Generated keys are three 4-character blocks of uppercase letters and
//! digits joined by hyphens: `XXXX-XXXX-XXXX`.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default redemption ceiling for newly minted keys.
pub const DEFAULT_MAX_USES: u32 = 3;

const KEY_BLOCKS: usize = 3;
const KEY_BLOCK_LEN: usize = 4;
const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A usage-limited activation key record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationKey {
    /// The key string itself (unique identity).
    pub key: String,
    /// Successful redemptions so far.
    pub uses: u32,
    /// Redemption ceiling.
    pub max_uses: u32,
    /// Free-text annotation set at mint time, never interpreted.
    pub comment: String,
}

impl ActivationKey {
    /// Creates a fresh record with no uses and the default quota.
    #[must_use]
    pub fn new(key: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            uses: 0,
            max_uses: DEFAULT_MAX_USES,
            comment: comment.into(),
        }
    }

    /// Returns true once the quota is fully consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.uses >= self.max_uses
    }

    /// Redemptions left before the key is exhausted.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.max_uses.saturating_sub(self.uses)
    }
}

/// Generates a fresh `XXXX-XXXX-XXXX` key.
///
/// Uniqueness is not guaranteed by generation alone; callers insert with a
/// duplicate check and regenerate on collision.
#[must_use]
pub fn generate_key() -> String {
    let mut rng = rand::thread_rng();
    let mut blocks = Vec::with_capacity(KEY_BLOCKS);
    for _ in 0..KEY_BLOCKS {
        let block: String = (0..KEY_BLOCK_LEN)
            .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
            .collect();
        blocks.push(block);
    }
    blocks.join("-")
}
