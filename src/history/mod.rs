//! Persisted conversation history per video.
//!
//! Each video's history lives beside its index as an ordered JSON array of
//! `{role, content}` records. The file is created empty when the index is
//! published and is append-only afterwards.

use crate::error::{Result, SvarError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// File name of the history inside a video directory.
pub const HISTORY_FILE: &str = "history.json";

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a video's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Write an empty history file into a (staged) video directory.
pub(crate) fn initialize_in(dir: &Path) -> Result<()> {
    fs::write(dir.join(HISTORY_FILE), "[]")?;
    Ok(())
}

/// Filesystem store of per-video conversation histories.
///
/// Shares its root with the index store; a video's history file sits next
/// to its index file.
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    /// Open a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn video_dir(&self, video_id: &str) -> PathBuf {
        self.root.join(video_id)
    }

    fn history_path(&self, video_id: &str) -> PathBuf {
        self.video_dir(video_id).join(HISTORY_FILE)
    }

    /// Read the ordered turn sequence for a video.
    ///
    /// Fails with `IndexNotFound` when the video was never loaded and with
    /// `CorruptState` when the history file is missing from an existing
    /// directory or cannot be parsed.
    #[instrument(skip(self))]
    pub fn read(&self, video_id: &str) -> Result<Vec<Turn>> {
        if !self.video_dir(video_id).exists() {
            return Err(SvarError::IndexNotFound(video_id.to_string()));
        }

        let path = self.history_path(video_id);
        let content = fs::read_to_string(&path).map_err(|e| {
            SvarError::CorruptState(format!(
                "History file for {} unreadable at {}: {}",
                video_id,
                path.display(),
                e
            ))
        })?;

        let turns: Vec<Turn> = serde_json::from_str(&content).map_err(|e| {
            SvarError::CorruptState(format!("History file for {} is malformed: {}", video_id, e))
        })?;

        Ok(turns)
    }

    /// Durably extend a video's history with the given turns.
    ///
    /// Re-reads the stored sequence and atomically replaces the file, so a
    /// crash mid-write never leaves a truncated history behind. Callers
    /// serialize appends per video; this method performs one whole
    /// read-extend-replace cycle.
    #[instrument(skip(self, turns), fields(count = turns.len()))]
    pub fn append(&self, video_id: &str, turns: &[Turn]) -> Result<()> {
        let mut all = self.read(video_id)?;
        all.extend_from_slice(turns);
        self.replace(video_id, &all)?;

        debug!("History for {} now has {} turns", video_id, all.len());
        Ok(())
    }

    fn replace(&self, video_id: &str, turns: &[Turn]) -> Result<()> {
        let dir = self.video_dir(video_id);
        let json = serde_json::to_vec_pretty(turns)?;

        let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
        staged.write_all(&json)?;
        staged.persist(self.history_path(video_id)).map_err(|e| {
            SvarError::History(format!("Failed to replace history for {}: {}", video_id, e))
        })?;

        Ok(())
    }
}
