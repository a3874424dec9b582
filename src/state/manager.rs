//! State manager implementation
//!
//! File-backed persistence with atomic writes; cursors survive process
//! restarts so an interrupted extraction resumes from its watermark.

use super::types::State;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// State manager for persisting and loading watermark cursors
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file, None for in-memory state
    path: Option<PathBuf>,
    /// Current state
    state: State,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: State::new(),
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?
        } else {
            State::new()
        };

        Ok(Self {
            path: Some(path),
            state,
        })
    }

    /// Create a state manager from an inline JSON string (not persisted)
    pub fn from_json(json: &str) -> Result<Self> {
        let state = serde_json::from_str(json)
            .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))?;
        Ok(Self { path: None, state })
    }

    /// The current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Watermark cursor for a stream
    pub fn cursor(&self, stream: &str) -> Option<&str> {
        self.state.get_cursor(stream)
    }

    /// Advance a stream's cursor and persist if file-backed
    pub fn advance_cursor(&mut self, stream: &str, cursor: String) -> Result<()> {
        self.state.set_cursor(stream, cursor);
        self.save()
    }

    /// Persist the current state if file-backed.
    ///
    /// Writes to a sibling temp file first so a crash mid-write never
    /// truncates the previous state.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.state)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| Error::state(format!("Failed to replace state file: {e}")))?;
        Ok(())
    }
}
