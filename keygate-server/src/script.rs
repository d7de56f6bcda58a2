//! File-backed activation script source.

use keygate_core::{GateError, GateResult, PayloadSource};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Reads the activation script from a configured path on every fetch, so
/// edits to the file are served without a restart.
pub struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    /// Creates a source for the given script path. The file may be absent
    /// at startup; absence is reported per fetch.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PayloadSource for ScriptFile {
    fn fetch(&self) -> GateResult<String> {
        info!("Getting activation script from {}", self.path.display());
        fs::read_to_string(&self.path).map_err(|e| {
            GateError::PayloadUnavailable(format!("{}: {e}", self.path.display()))
        })
    }
}
