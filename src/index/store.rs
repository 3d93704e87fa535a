//! Durable storage for per-video indexes.
//!
//! Each video owns one directory under the store root holding the
//! serialized index and the conversation history file. Directory presence
//! is the "index built" signal, so a build stages the complete directory
//! under a hidden name and renames it into place in one step. Readers never
//! observe a half-written index.

use super::VectorIndex;
use crate::error::{Result, SvarError};
use crate::history;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// File name of the serialized index inside a video directory.
pub const INDEX_FILE: &str = "index.json";

/// Summary of one indexed video, for listings.
#[derive(Debug, Clone)]
pub struct IndexSummary {
    /// Video ID.
    pub video_id: String,
    /// Number of indexed chunks.
    pub chunk_count: usize,
    /// Embedding model the index was built with.
    pub embedding_model: String,
    /// When the index was built.
    pub created_at: DateTime<Utc>,
}

/// Filesystem store of per-video index directories.
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory owned by one video.
    pub fn video_dir(&self, video_id: &str) -> PathBuf {
        self.root.join(video_id)
    }

    /// Whether an index has been built for the video.
    pub fn exists(&self, video_id: &str) -> bool {
        self.video_dir(video_id).join(INDEX_FILE).is_file()
    }

    /// Publish a freshly built index.
    ///
    /// Stages the video directory (index plus empty history) under a hidden
    /// name and renames it into place. A no-op when the video is already
    /// published; a cross-process race on the rename surfaces as a
    /// `Concurrency` error and leaves the winner's directory intact.
    #[instrument(skip(self, index), fields(video_id = %index.video_id))]
    pub fn publish(&self, index: &VectorIndex) -> Result<()> {
        let final_dir = self.video_dir(&index.video_id);
        if final_dir.exists() {
            debug!("Index for {} already published, skipping", index.video_id);
            return Ok(());
        }

        let staging = self.root.join(format!(".{}.staging", index.video_id));
        if staging.exists() {
            // Leftover from a build that died before renaming.
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        if let Err(e) = Self::write_staged(&staging, index) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        match fs::rename(&staging, &final_dir) {
            Ok(()) => {
                info!(
                    "Published index for {} ({} chunks)",
                    index.video_id,
                    index.len()
                );
                Ok(())
            }
            Err(_) if final_dir.exists() => {
                let _ = fs::remove_dir_all(&staging);
                Err(SvarError::Concurrency(index.video_id.clone()))
            }
            Err(e) => {
                let _ = fs::remove_dir_all(&staging);
                Err(e.into())
            }
        }
    }

    fn write_staged(staging: &Path, index: &VectorIndex) -> Result<()> {
        let json = serde_json::to_vec(index)?;
        fs::write(staging.join(INDEX_FILE), json)?;
        history::initialize_in(staging)?;
        Ok(())
    }

    /// Load a published index.
    ///
    /// Fails with `IndexNotFound` when the video has never been published
    /// and with `CorruptState` when the directory exists but its index file
    /// is missing or unreadable.
    #[instrument(skip(self))]
    pub fn load(&self, video_id: &str) -> Result<VectorIndex> {
        let dir = self.video_dir(video_id);
        if !dir.exists() {
            return Err(SvarError::IndexNotFound(video_id.to_string()));
        }

        let path = dir.join(INDEX_FILE);
        let content = fs::read_to_string(&path).map_err(|e| {
            SvarError::CorruptState(format!(
                "Index file for {} unreadable at {}: {}",
                video_id,
                path.display(),
                e
            ))
        })?;

        let index: VectorIndex = serde_json::from_str(&content).map_err(|e| {
            SvarError::CorruptState(format!("Index file for {} is malformed: {}", video_id, e))
        })?;

        debug!("Loaded index for {} ({} entries)", video_id, index.len());
        Ok(index)
    }

    /// List all published videos, most recently built first.
    pub fn list(&self) -> Result<Vec<IndexSummary>> {
        let mut summaries = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                // Staging directory from an in-flight or crashed build.
                continue;
            }

            let index = self.load(&name)?;
            summaries.push(IndexSummary {
                video_id: index.video_id,
                chunk_count: index.entries.len(),
                embedding_model: index.embedding_model,
                created_at: index.created_at,
            });
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexEntry;

    fn sample_index(video_id: &str) -> VectorIndex {
        VectorIndex::build(
            video_id,
            "test-model",
            2,
            vec![
                IndexEntry {
                    content: "first chunk".to_string(),
                    embedding: vec![1.0, 0.0],
                    order: 0,
                },
                IndexEntry {
                    content: "second chunk".to_string(),
                    embedding: vec![0.0, 1.0],
                    order: 1,
                },
            ],
        )
    }

    #[test]
    fn test_publish_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        assert!(!store.exists("video1"));
        store.publish(&sample_index("video1")).unwrap();
        assert!(store.exists("video1"));

        let loaded = store.load("video1").unwrap();
        assert_eq!(loaded.video_id, "video1");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.entries[0].content, "first chunk");
    }

    #[test]
    fn test_publish_creates_history_alongside_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        store.publish(&sample_index("video1")).unwrap();
        assert!(store.video_dir("video1").join(history::HISTORY_FILE).is_file());
    }

    #[test]
    fn test_publish_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        store.publish(&sample_index("video1")).unwrap();
        store.publish(&sample_index("video1")).unwrap();

        assert_eq!(store.load("video1").unwrap().len(), 2);
    }

    #[test]
    fn test_load_absent_video_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        match store.load("missing") {
            Err(SvarError::IndexNotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("expected IndexNotFound, got {:?}", other.map(|i| i.video_id)),
        }
    }

    #[test]
    fn test_load_malformed_index_is_corrupt_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        store.publish(&sample_index("video1")).unwrap();
        fs::write(store.video_dir("video1").join(INDEX_FILE), "not json").unwrap();

        assert!(matches!(
            store.load("video1"),
            Err(SvarError::CorruptState(_))
        ));
    }

    #[test]
    fn test_list_skips_staging_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path()).unwrap();

        store.publish(&sample_index("video1")).unwrap();
        fs::create_dir_all(dir.path().join(".video2.staging")).unwrap();

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].video_id, "video1");
        assert_eq!(summaries[0].chunk_count, 2);
    }
}
