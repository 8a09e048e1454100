use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_STATE_FILE: &str = "last_ipo_state.json";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write state file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct RunState {
    last_max_id: u64,
}

/// What was found at the state path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLoad {
    Missing,
    /// The file exists but its content is corrupt or lacks `last_max_id`.
    Invalid(String),
    /// The file exists but cannot be read at all (permissions, a directory, ...).
    Unreadable(String),
    Loaded(u64),
}

/// Persists the highest IPO id processed so far.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StateLoad {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StateLoad::Missing,
            // Not UTF-8: a torn write, same as any other corrupt content.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return StateLoad::Invalid(e.to_string())
            }
            Err(e) => return StateLoad::Unreadable(e.to_string()),
        };
        match serde_json::from_str::<RunState>(&content) {
            Ok(state) => StateLoad::Loaded(state.last_max_id),
            Err(e) => StateLoad::Invalid(e.to_string()),
        }
    }

    /// Read the watermark, falling back to 0 when the file is absent or its content is
    /// unusable. A file that exists but cannot be read is an error: carrying on at 0 would
    /// re-send the same alerts on every run while the write keeps failing.
    pub fn read_last_max_id(&self) -> Result<u64, StateError> {
        match self.load() {
            StateLoad::Missing => {
                tracing::info!(path = %self.path.display(), "no state file found, treating all IPOs as new");
                Ok(0)
            }
            StateLoad::Invalid(reason) => {
                tracing::warn!(path = %self.path.display(), %reason, "invalid state file, resetting to 0");
                Ok(0)
            }
            StateLoad::Unreadable(reason) => Err(StateError::Unreadable {
                path: self.path.clone(),
                reason,
            }),
            StateLoad::Loaded(id) => {
                tracing::debug!(last_max_id = id, "loaded state");
                Ok(id)
            }
        }
    }

    /// Replace the state file with `{"last_max_id": value}`.
    ///
    /// Writes to a sibling temp file first and renames it over the target, so a crash
    /// mid-write leaves the previous state intact.
    pub fn write_last_max_id(&self, value: u64) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(&RunState { last_max_id: value })?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::info!(last_max_id = value, path = %self.path.display(), "updated state file");
        Ok(())
    }
}
