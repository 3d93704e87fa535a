//! YouTube caption track source.
//!
//! Fetches the timedtext XML for a video and parses it into snippets. An
//! empty response body means YouTube has no caption track for the requested
//! language.

use super::{Transcript, TranscriptSnippet, TranscriptSource};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const TIMEDTEXT_ENDPOINT: &str = "https://video.google.com/timedtext";

/// YouTube transcript source backed by the timedtext endpoint.
pub struct YoutubeTranscriptSource {
    http: reqwest::Client,
    video_id_regex: Regex,
    snippet_regex: Regex,
}

impl YoutubeTranscriptSource {
    /// Create a source with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        let snippet_regex = Regex::new(
            r#"(?s)<text start="([0-9.]+)" dur="([0-9.]+)"[^>]*>(.*?)</text>"#,
        )
        .expect("Invalid regex");

        Ok(Self {
            http,
            video_id_regex,
            snippet_regex,
        })
    }

    /// Extract video ID from a YouTube URL or bare ID.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        // Try group 1 (URL format) then group 2 (bare ID)
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Parse the timedtext XML body into snippets.
    fn parse_snippets(&self, body: &str) -> Vec<TranscriptSnippet> {
        self.snippet_regex
            .captures_iter(body)
            .filter_map(|caps| {
                let start_seconds: f64 = caps.get(1)?.as_str().parse().ok()?;
                let duration_seconds: f64 = caps.get(2)?.as_str().parse().ok()?;
                let text = unescape_xml(caps.get(3)?.as_str());
                if text.trim().is_empty() {
                    return None;
                }
                Some(TranscriptSnippet {
                    text,
                    start_seconds,
                    duration_seconds,
                })
            })
            .collect()
    }
}

/// Decode the XML entities the timedtext endpoint emits.
fn unescape_xml(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    fn extract_id(&self, input: &str) -> Option<String> {
        self.extract_video_id(input)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str, language: &str) -> Result<Transcript> {
        let video_id = self.extract_video_id(video_id).ok_or_else(|| {
            SvarError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", video_id))
        })?;

        let url = Url::parse_with_params(
            TIMEDTEXT_ENDPOINT,
            &[("lang", language), ("v", video_id.as_str())],
        )
        .map_err(|e| SvarError::Transcript(format!("Failed to build caption URL: {}", e)))?;

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SvarError::Transcript(format!("Caption fetch timed out for {}", video_id))
            } else {
                SvarError::Transcript(format!("Caption fetch failed for {}: {}", video_id, e))
            }
        })?;

        if !response.status().is_success() {
            return Err(SvarError::Transcript(format!(
                "Caption endpoint returned {} for {}",
                response.status(),
                video_id
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SvarError::Transcript(format!("Failed to read caption body: {}", e)))?;

        // YouTube answers 200 with an empty body when no track exists.
        if body.trim().is_empty() {
            return Err(SvarError::TranscriptNotFound(video_id));
        }

        let snippets = self.parse_snippets(&body);
        if snippets.is_empty() {
            return Err(SvarError::TranscriptNotFound(video_id));
        }

        debug!("Fetched {} caption snippets for {}", snippets.len(), video_id);

        Ok(Transcript {
            video_id,
            language: language.to_string(),
            snippets,
        })
    }
}
