//! Error types for Svar.

use thiserror::Error;

/// Library-level error type for Svar operations.
#[derive(Error, Debug)]
pub enum SvarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcript fetch failed: {0}")]
    Transcript(String),

    #[error("No transcript available for video: {0}")]
    TranscriptNotFound(String),

    #[error("No index built for video: {0}")]
    IndexNotFound(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Conversation history error: {0}")]
    History(String),

    #[error("Corrupt persisted state: {0}")]
    CorruptState(String),

    #[error("Answer synthesis failed: {0}")]
    Synthesis(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Conflicting writers for video: {0}")]
    Concurrency(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SvarError {
    /// Whether this error maps to a not-found condition at the API boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SvarError::TranscriptNotFound(_) | SvarError::IndexNotFound(_)
        )
    }
}

/// Result type alias for Svar operations.
pub type Result<T> = std::result::Result<T, SvarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(SvarError::TranscriptNotFound("abc".to_string()).is_not_found());
        assert!(SvarError::IndexNotFound("abc".to_string()).is_not_found());
        assert!(!SvarError::Embedding("quota".to_string()).is_not_found());
        assert!(!SvarError::CorruptState("bad json".to_string()).is_not_found());
    }
}
