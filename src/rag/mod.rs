//! Retrieval-augmented answer synthesis.

mod engine;

pub use engine::AnswerEngine;

use crate::error::Result;
use crate::history::Turn;
use async_trait::async_trait;

/// Trait for answer synthesis implementations.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Produce an answer to `question` from the retrieved passages and the
    /// prior conversation. Does not persist anything; the caller records
    /// the resulting turn pair.
    async fn answer(&self, question: &str, passages: &[String], history: &[Turn])
        -> Result<String>;
}

/// Join retrieved passages into the block embedded in the system prompt.
pub fn format_context_for_prompt(passages: &[String]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| format!("---\n[{}]\n{}\n---", i + 1, passage))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_context_numbers_passages() {
        let passages = vec!["first passage".to_string(), "second passage".to_string()];
        let formatted = format_context_for_prompt(&passages);

        assert!(formatted.contains("[1]\nfirst passage"));
        assert!(formatted.contains("[2]\nsecond passage"));
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context_for_prompt(&[]), "");
    }
}
