//! Session memory persisted between invocations.
//!
//! One JSON object on disk, read once at process start and written once at
//! the end of a successful invocation (or after an explicit rollback). A
//! missing or unreadable file never aborts the program: `load` falls back to
//! empty defaults.

use crate::core::error::HcmdError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Capacity of the `recent_objects` ring.
pub const RECENT_OBJECTS_CAP: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub last_path: Option<String>,
    pub last_src: Option<String>,
    pub last_dst: Option<String>,
    pub last_git_intent: Option<String>,
    /// Rollback commands, newest last.
    pub history: Vec<String>,
    /// Most recently touched paths, newest last.
    pub recent_objects: VecDeque<String>,
}

#[derive(Debug, Clone)]
pub struct SessionMemory {
    path: PathBuf,
    pub state: SessionState,
}

impl SessionMemory {
    /// Memory that is never persisted anywhere useful. Handy for tests and
    /// for explain mode.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: SessionState::default(),
        }
    }

    /// Best-effort load: missing or corrupt files yield empty defaults.
    pub fn load(path: &Path) -> Self {
        let state = match Self::try_load(path) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "session memory unreadable, starting fresh");
                SessionState::default()
            }
        };
        Self {
            path: path.to_path_buf(),
            state,
        }
    }

    /// Strict loader. Missing file is not an error.
    pub fn try_load(path: &Path) -> Result<SessionState, HcmdError> {
        if !path.exists() {
            return Ok(SessionState::default());
        }
        let content = fs::read_to_string(path)?;
        let mut state: SessionState = serde_json::from_str(&content)
            .map_err(|e| HcmdError::CorruptState(format!("{}: {}", path.display(), e)))?;
        // A hand-edited file may exceed the ring capacity.
        while state.recent_objects.len() > RECENT_OBJECTS_CAP {
            state.recent_objects.pop_front();
        }
        Ok(state)
    }

    /// Overwrite the whole structure: write a sibling temp file, then rename.
    pub fn save(&self) -> Result<(), HcmdError> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&self.state)?;
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a touched path: append to the ring (FIFO eviction) and make it
    /// the pronoun target.
    pub fn push_object(&mut self, path: &str) {
        self.state.recent_objects.push_back(path.to_string());
        while self.state.recent_objects.len() > RECENT_OBJECTS_CAP {
            self.state.recent_objects.pop_front();
        }
        self.state.last_path = Some(path.to_string());
    }

    pub fn push_rollback(&mut self, command: String) {
        self.state.history.push(command);
    }

    pub fn pop_rollback(&mut self) -> Option<String> {
        self.state.history.pop()
    }

    pub fn history_len(&self) -> usize {
        self.state.history.len()
    }

    pub fn peek_rollback(&self) -> Option<&str> {
        self.state.history.last().map(String::as_str)
    }

    pub fn last_path(&self) -> Option<&str> {
        self.state.last_path.as_deref()
    }

    pub fn last_src(&self) -> Option<&str> {
        self.state.last_src.as_deref()
    }

    pub fn last_dst(&self) -> Option<&str> {
        self.state.last_dst.as_deref()
    }

    pub fn last_git_intent(&self) -> Option<&str> {
        self.state.last_git_intent.as_deref()
    }

    pub fn set_last_src(&mut self, src: &str) {
        self.state.last_src = Some(src.to_string());
    }

    pub fn set_last_dst(&mut self, dst: &str) {
        self.state.last_dst = Some(dst.to_string());
    }

    pub fn set_last_git_intent(&mut self, intent: &str) {
        self.state.last_git_intent = Some(intent.to_string());
    }

    pub fn recent_objects(&self) -> impl Iterator<Item = &str> {
        self.state.recent_objects.iter().map(String::as_str)
    }
}
