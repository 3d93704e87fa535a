//! Transcript acquisition from caption sources.

mod youtube;

pub use youtube::YoutubeTranscriptSource;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single caption snippet with timing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    /// Spoken text of this snippet.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Duration in seconds.
    pub duration_seconds: f64,
}

/// A fetched transcript for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID the transcript belongs to.
    pub video_id: String,
    /// Caption language that was fetched.
    pub language: String,
    /// Ordered caption snippets.
    pub snippets: Vec<TranscriptSnippet>,
}

impl Transcript {
    /// Concatenate all snippet texts into one document string.
    pub fn full_text(&self) -> String {
        self.snippets
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the caption track for a video in the given language.
    ///
    /// Fails with `TranscriptNotFound` when the video has no captions in
    /// that language. A single fetch attempt is made per call.
    async fn fetch(&self, video_id: &str, language: &str) -> Result<Transcript>;

    /// Extract the canonical video ID from user input (URL or bare ID).
    fn extract_id(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            None
        } else {
            Some(input.to_string())
        }
    }
}
