//! Crash-safe persistence of [`PersistedState`].
//!
//! Writes go to a temp file in the destination directory, are synced, then
//! renamed over the target. A crash leaves either the old file or the new
//! one, never a truncated mix.

use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::models::state::PersistedState;

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous cycle's cursor.
    ///
    /// A missing file is the first run. Unreadable or corrupt content is
    /// logged and replaced by defaults; loading never fails the cycle.
    pub fn load(&self) -> PersistedState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {}, starting fresh", self.path.display());
                return PersistedState::default();
            }
            Err(e) => {
                warn!("Failed to read state file {}: {e}", self.path.display());
                return PersistedState::default();
            }
        };

        match serde_json::from_str::<PersistedState>(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "State file {} is corrupt, using defaults: {e}",
                    self.path.display()
                );
                PersistedState::default()
            }
        }
    }

    /// Atomically replace the state file with `state`.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create state directory {}", parent.display()))?;

        let mut content =
            serde_json::to_string_pretty(state).context("Failed to serialize state")?;
        content.push('\n');

        let mut staging =
            NamedTempFile::new_in(&parent).context("Failed to create staging temp file")?;
        staging
            .write_all(content.as_bytes())
            .context("Failed to write state")?;
        staging
            .as_file()
            .sync_all()
            .context("Failed to sync state to disk")?;
        staging
            .persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}
