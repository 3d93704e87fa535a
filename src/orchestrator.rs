//! Pipeline orchestration for Svar.
//!
//! Coordinates the load path (fetch transcript, chunk, embed, build and
//! publish the index) and the query path (retrieve, synthesize, record the
//! conversation turns).

use crate::chunking::{ChunkingConfig, RecursiveSplitter};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SvarError};
use crate::history::{HistoryStore, Turn};
use crate::index::{IndexEntry, IndexStore, VectorIndex};
use crate::openai::create_client;
use crate::rag::{AnswerEngine, Synthesizer};
use crate::transcript::{TranscriptSource, YoutubeTranscriptSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// The main orchestrator for the Svar pipeline.
///
/// Constructed once at process startup; every request runs against the
/// same service handles.
pub struct Orchestrator {
    settings: Settings,
    transcripts: Arc<dyn TranscriptSource>,
    embedder: Arc<dyn Embedder>,
    synthesizer: Arc<dyn Synthesizer>,
    splitter: RecursiveSplitter,
    index_store: IndexStore,
    history_store: HistoryStore,
    // One lock per video serializes index builds and history appends.
    video_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    /// Create an orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let client = create_client();

        let transcripts: Arc<dyn TranscriptSource> = Arc::new(YoutubeTranscriptSource::new(
            Duration::from_secs(settings.transcript.timeout_seconds),
        )?);

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(
            client.clone(),
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let synthesizer: Arc<dyn Synthesizer> = Arc::new(AnswerEngine::new(
            client,
            &settings.rag.model,
            settings.rag.temperature,
            settings.rag.max_history_turns,
            Prompts::default(),
        ));

        Self::with_components(settings, transcripts, embedder, synthesizer)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        transcripts: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Result<Self> {
        settings.validate()?;

        let splitter = RecursiveSplitter::new(ChunkingConfig {
            chunk_size: settings.chunking.chunk_size,
            overlap: settings.chunking.overlap,
        });
        let index_store = IndexStore::new(settings.index_root())?;
        let history_store = HistoryStore::new(settings.index_root());

        Ok(Self {
            settings,
            transcripts,
            embedder,
            synthesizer,
            splitter,
            index_store,
            history_store,
            video_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a reference to the index store.
    pub fn index_store(&self) -> &IndexStore {
        &self.index_store
    }

    async fn lock_for(&self, video_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.video_locks.lock().await;
        locks
            .entry(video_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Build and publish the index for a video.
    ///
    /// Idempotent: when the video is already indexed, nothing is fetched or
    /// embedded and the current conversation history is returned. At most
    /// one build runs per video; concurrent callers wait and then take the
    /// skip path.
    #[instrument(skip(self), fields(video = %video))]
    pub async fn load(&self, video: &str) -> Result<LoadOutcome> {
        let video_id = self.transcripts.extract_id(video).ok_or_else(|| {
            SvarError::InvalidInput(format!("Invalid video ID or URL: {}", video))
        })?;
        let video_id = validate_video_id(&video_id)?;

        let lock = self.lock_for(&video_id).await;
        let _guard = lock.lock().await;

        if self.index_store.exists(&video_id) {
            info!("Video {} is already indexed, skipping", video_id);
            let history = self.history_store.read(&video_id)?;
            return Ok(LoadOutcome {
                video_id,
                chunks_indexed: 0,
                skipped: true,
                history,
            });
        }

        let transcript = self
            .transcripts
            .fetch(&video_id, &self.settings.transcript.language)
            .await?;
        let document = transcript.full_text();

        let chunks = self.splitter.split(&document);
        if chunks.is_empty() {
            return Err(SvarError::TranscriptNotFound(video_id));
        }
        info!("Split transcript for {} into {} chunks", video_id, chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(SvarError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                content: chunk.content,
                embedding,
                order: chunk.order,
            })
            .collect();

        let index = VectorIndex::build(
            video_id.clone(),
            &self.settings.embedding.model,
            self.settings.embedding.dimensions as usize,
            entries,
        );
        let chunks_indexed = index.len();

        self.index_store.publish(&index)?;

        Ok(LoadOutcome {
            video_id,
            chunks_indexed,
            skipped: false,
            history: Vec::new(),
        })
    }

    /// Answer a question about an indexed video.
    ///
    /// Retrieves the most similar transcript passages, synthesizes an
    /// answer carrying the stored conversation, and appends the
    /// (question, answer) pair to the history. Nothing is appended when
    /// synthesis fails.
    #[instrument(skip(self, question), fields(video_id = %video_id))]
    pub async fn query(&self, video_id: &str, question: &str) -> Result<String> {
        let video_id = validate_video_id(video_id)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(SvarError::InvalidInput("Question must not be empty".to_string()));
        }

        if !self.index_store.exists(&video_id) {
            return Err(SvarError::IndexNotFound(video_id));
        }

        let index = self.index_store.load(&video_id)?;
        let query_embedding = self.embedder.embed(question).await?;
        let hits = index.search(&query_embedding, self.settings.rag.max_context_chunks);
        let passages: Vec<String> = hits.into_iter().map(|h| h.content).collect();

        let history = self.history_store.read(&video_id)?;
        let answer = self
            .synthesizer
            .answer(question, &passages, &history)
            .await?;

        let lock = self.lock_for(&video_id).await;
        let _guard = lock.lock().await;
        self.history_store
            .append(&video_id, &[Turn::user(question), Turn::assistant(answer.as_str())])?;

        Ok(answer)
    }

    /// Read the stored conversation history for a video.
    pub async fn history(&self, video_id: &str) -> Result<Vec<Turn>> {
        let video_id = validate_video_id(video_id)?;
        self.history_store.read(&video_id)
    }
}

/// Result of a load operation.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Video ID.
    pub video_id: String,
    /// Number of chunks indexed by this call (0 when skipped).
    pub chunks_indexed: usize,
    /// Whether the build was skipped because the index already existed.
    pub skipped: bool,
    /// Conversation history at the time of the call.
    pub history: Vec<Turn>,
}

/// Check that a video ID is safe to use as a directory name.
fn validate_video_id(video_id: &str) -> Result<String> {
    let video_id = video_id.trim();
    let valid = !video_id.is_empty()
        && video_id.len() <= 64
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(video_id.to_string())
    } else {
        Err(SvarError::InvalidInput(format!(
            "Invalid video ID: {}",
            video_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Role;
    use crate::transcript::{Transcript, TranscriptSnippet};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed transcript and counts fetches.
    struct FakeTranscripts {
        text: Option<String>,
        fetches: AtomicUsize,
    }

    impl FakeTranscripts {
        fn with_text(text: &str) -> Self {
            Self {
                text: Some(text.to_string()),
                fetches: AtomicUsize::new(0),
            }
        }

        fn unavailable() -> Self {
            Self {
                text: None,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TranscriptSource for FakeTranscripts {
        async fn fetch(&self, video_id: &str, language: &str) -> Result<Transcript> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match &self.text {
                Some(text) => Ok(Transcript {
                    video_id: video_id.to_string(),
                    language: language.to_string(),
                    snippets: vec![TranscriptSnippet {
                        text: text.clone(),
                        start_seconds: 0.0,
                        duration_seconds: 1.0,
                    }],
                }),
                None => Err(SvarError::TranscriptNotFound(video_id.to_string())),
            }
        }
    }

    /// Deterministic embedder: vector derived from text bytes.
    struct FakeEmbedder {
        calls: AtomicUsize,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn vector_for(text: &str) -> Vec<f32> {
            let sum: u32 = text.bytes().map(u32::from).sum();
            vec![(sum % 97) as f32 + 1.0, (text.len() % 89) as f32 + 1.0]
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector_for(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Echoes the question and reports how much context it saw.
    struct FakeSynthesizer;

    #[async_trait]
    impl Synthesizer for FakeSynthesizer {
        async fn answer(
            &self,
            question: &str,
            passages: &[String],
            history: &[Turn],
        ) -> Result<String> {
            Ok(format!(
                "answer to '{}' from {} passages and {} prior turns",
                question,
                passages.len(),
                history.len()
            ))
        }
    }

    fn test_settings(dir: &tempfile::TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.general.data_dir = dir.path().to_string_lossy().to_string();
        settings.embedding.dimensions = 2;
        settings
    }

    fn orchestrator_with(
        dir: &tempfile::TempDir,
        transcripts: Arc<FakeTranscripts>,
    ) -> Orchestrator {
        Orchestrator::with_components(
            test_settings(dir),
            transcripts,
            Arc::new(FakeEmbedder::new()),
            Arc::new(FakeSynthesizer),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_then_query_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::with_text(
            &"the quick brown fox jumps over the lazy dog ".repeat(114),
        ));
        let orchestrator = orchestrator_with(&dir, transcripts);

        let outcome = orchestrator.load("abc123xyz01").await.unwrap();
        assert!(!outcome.skipped);
        assert!(outcome.chunks_indexed >= 5);
        assert!(outcome.history.is_empty());

        let answer = orchestrator
            .query("abc123xyz01", "What is this about?")
            .await
            .unwrap();
        assert!(!answer.is_empty());

        let history = orchestrator.history("abc123xyz01").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "What is this about?");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, answer);
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::with_text(
            &"some spoken words repeated over and over ".repeat(50),
        ));
        let orchestrator = orchestrator_with(&dir, transcripts.clone());

        let first = orchestrator.load("abc123xyz01").await.unwrap();
        assert!(!first.skipped);

        orchestrator
            .query("abc123xyz01", "anything?")
            .await
            .unwrap();

        let second = orchestrator.load("abc123xyz01").await.unwrap();
        assert!(second.skipped);
        assert_eq!(second.chunks_indexed, 0);
        // The transcript was fetched exactly once, and history survived.
        assert_eq!(transcripts.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(second.history.len(), 2);
    }

    #[tokio::test]
    async fn test_history_grows_by_two_per_query() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::with_text(
            &"words words words ".repeat(100),
        ));
        let orchestrator = orchestrator_with(&dir, transcripts);

        orchestrator.load("abc123xyz01").await.unwrap();

        for i in 1..=3 {
            orchestrator
                .query("abc123xyz01", &format!("question {}", i))
                .await
                .unwrap();
            let history = orchestrator.history("abc123xyz01").await.unwrap();
            assert_eq!(history.len(), 2 * i);
        }

        let history = orchestrator.history("abc123xyz01").await.unwrap();
        assert_eq!(history[2].content, "question 2");
        assert_eq!(history[4].content, "question 3");
    }

    #[tokio::test]
    async fn test_query_without_load_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::with_text("irrelevant"));
        let orchestrator = orchestrator_with(&dir, transcripts);

        assert!(matches!(
            orchestrator.query("neverloaded", "hello?").await,
            Err(SvarError::IndexNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_transcript_leaves_no_state() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::unavailable());
        let orchestrator = orchestrator_with(&dir, transcripts);

        assert!(matches!(
            orchestrator.load("abc123xyz01").await,
            Err(SvarError::TranscriptNotFound(_))
        ));

        // No directory or partial state was created.
        assert!(!orchestrator.index_store().exists("abc123xyz01"));
        assert!(!dir.path().join("indexes").join("abc123xyz01").exists());
    }

    #[tokio::test]
    async fn test_invalid_video_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::with_text("irrelevant"));
        let orchestrator = orchestrator_with(&dir, transcripts);

        assert!(matches!(
            orchestrator.load("../escape").await,
            Err(SvarError::InvalidInput(_))
        ));
        assert!(matches!(
            orchestrator.query("a/b", "hi").await,
            Err(SvarError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_question_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::with_text("irrelevant"));
        let orchestrator = orchestrator_with(&dir, transcripts);

        assert!(matches!(
            orchestrator.query("abc123xyz01", "   ").await,
            Err(SvarError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_loads_build_once() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = Arc::new(FakeTranscripts::with_text(
            &"concurrency test words ".repeat(100),
        ));
        let orchestrator = Arc::new(orchestrator_with(&dir, transcripts.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let orch = orchestrator.clone();
            handles.push(tokio::spawn(async move { orch.load("abc123xyz01").await }));
        }

        let mut built = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if !outcome.skipped {
                built += 1;
            }
        }

        assert_eq!(built, 1);
        assert_eq!(transcripts.fetches.load(Ordering::SeqCst), 1);
    }
}
