//! Session persistence layer.
//!
//! The relay keeps a single record on disk:
//!
//! ```text
//! conversation_history.json
//! {
//!   "conversation_id": "abc",
//!   "model": "deepseek"
//! }
//! ```
//!
//! The record is global to the process. Stores are injected into the router
//! through [`SessionStore`] so tests can swap in [`MemoryStore`].

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{ChatError, ChatResult};
use crate::types::SessionState;

/// Default location of the state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = "conversation_history.json";

/// Storage port for the session record.
pub trait SessionStore: Send + Sync {
    /// Load the stored record, or the default record when none exists.
    fn load(&self) -> ChatResult<SessionState>;

    /// Replace the stored record.
    fn save(&self, conversation_id: Option<&str>, model: &str) -> ChatResult<()>;
}

/// Session record stored as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> ChatResult<SessionState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {}, using defaults", self.path.display());
                return Ok(SessionState::default());
            }
            Err(e) => return Err(ChatError::IoError(e)),
        };

        match serde_json::from_str::<SessionState>(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(
                    "Ignoring malformed state file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(SessionState::default())
            }
        }
    }

    fn save(&self, conversation_id: Option<&str>, model: &str) -> ChatResult<()> {
        let state = SessionState::new(conversation_id.map(str::to_string), model);
        let content = serde_json::to_string_pretty(&state)?;

        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        // Write next to the target and rename so readers never see a
        // partial record.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| ChatError::IoError(e.error))?;

        debug!(
            "Saved session state to {} (model={}, conversation={:?})",
            self.path.display(),
            model,
            conversation_id
        );
        Ok(())
    }
}

/// In-memory store that records every save.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<SessionState>>,
    saves: Arc<RwLock<Vec<SessionState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record.
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            saves: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Current record.
    pub fn current(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Every record passed to `save`, oldest first.
    pub fn saves(&self) -> Vec<SessionState> {
        self.saves.read().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.read().len()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> ChatResult<SessionState> {
        Ok(self.current())
    }

    fn save(&self, conversation_id: Option<&str>, model: &str) -> ChatResult<()> {
        let state = SessionState::new(conversation_id.map(str::to_string), model);
        *self.state.write() = state.clone();
        self.saves.write().push(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_records_saves() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), SessionState::default());

        store.save(Some("c1"), "deepseek-think").unwrap();
        store.save(None, "deepseek").unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.saves()[0].conversation_id.as_deref(), Some("c1"));
        assert_eq!(store.current(), SessionState::default());
    }

    #[test]
    fn test_parent_dir_for_bare_file_name() {
        let store = JsonFileStore::new(DEFAULT_STATE_FILE);
        assert_eq!(store.parent_dir(), PathBuf::from("."));

        let nested = JsonFileStore::new("state/session.json");
        assert_eq!(nested.parent_dir(), PathBuf::from("state"));
    }
}
