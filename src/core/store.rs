//! # History Persistence
//!
//! The navigation history lives in a single JSON file (by default
//! `~/.infiwiki/history.json`). It is read once at startup and rewritten
//! after every navigation.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.
//! A file that cannot be parsed, or parses into an impossible history, is
//! deleted and the default history is used instead.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::core::history::HistoryState;

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "history I/O error: {e}"),
            StoreError::Serialize(e) => write!(f, "history serialization error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Returns `~/.infiwiki/history.json`.
pub fn default_history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".infiwiki").join("history.json"))
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved history, falling back to `default` when there is none.
    ///
    /// Corrupt or structurally invalid files are removed so the next start
    /// doesn't trip over them again.
    pub fn load_or(&self, default: HistoryState) -> HistoryState {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No saved history at {}", self.path.display());
                return default;
            }
            Err(e) => {
                warn!("Failed to read history from {}: {}", self.path.display(), e);
                self.discard();
                return default;
            }
        };

        let parsed = serde_json::from_str::<HistoryState>(&json)
            .map_err(|e| e.to_string())
            .and_then(|state| state.validate().map(|_| state));

        match parsed {
            Ok(state) => {
                info!(
                    "Loaded history ({} topics, at {:?}) from {}",
                    state.topics.len(),
                    state.current_topic(),
                    self.path.display()
                );
                state
            }
            Err(reason) => {
                warn!(
                    "Discarding invalid history at {}: {}",
                    self.path.display(),
                    reason
                );
                self.discard();
                default
            }
        }
    }

    pub fn save(&self, state: &HistoryState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }
        atomic_write_json(&self.path, state)
    }

    fn discard(&self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string(data).map_err(StoreError::Serialize)?;
    fs::write(&tmp_path, json).map_err(StoreError::Io)?;
    fs::rename(&tmp_path, path).map_err(StoreError::Io)?;
    Ok(())
}
