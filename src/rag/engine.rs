//! Chat-model answer generation.

use super::{format_context_for_prompt, Synthesizer};
use crate::config::Prompts;
use crate::error::{Result, SvarError};
use crate::history::{Role, Turn};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Answer engine backed by an OpenAI chat model.
pub struct AnswerEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_history_turns: usize,
    prompts: Prompts,
}

impl AnswerEngine {
    /// Create an engine using a shared client handle.
    pub fn new(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        model: &str,
        temperature: f32,
        max_history_turns: usize,
        prompts: Prompts,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
            max_history_turns,
            prompts,
        }
    }

    /// Assemble the structured prompt: system instruction with the
    /// retrieved excerpts, the windowed conversation history in order, and
    /// the question as the final user turn.
    fn build_messages(
        &self,
        question: &str,
        passages: &[String],
        history: &[Turn],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context_for_prompt(passages));
        let system = self.prompts.render(&self.prompts.rag.system, &vars);

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| SvarError::Synthesis(e.to_string()))?
                .into(),
        ];

        let window_start = history.len().saturating_sub(self.max_history_turns);
        for turn in &history[window_start..] {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| SvarError::Synthesis(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| SvarError::Synthesis(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(question.to_string())
                .build()
                .map_err(|e| SvarError::Synthesis(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }
}

#[async_trait]
impl Synthesizer for AnswerEngine {
    #[instrument(skip(self, passages, history), fields(question = %question))]
    async fn answer(
        &self,
        question: &str,
        passages: &[String],
        history: &[Turn],
    ) -> Result<String> {
        let messages = self.build_messages(question, passages, history)?;

        debug!(
            "Requesting answer from {} with {} context passages and {} history turns",
            self.model,
            passages.len(),
            history.len().min(self.max_history_turns)
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SvarError::Synthesis(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SvarError::OpenAI(format!("Failed to generate answer: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .ok_or_else(|| SvarError::Synthesis("Empty response from model".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::create_client;

    fn engine() -> AnswerEngine {
        AnswerEngine::new(create_client(), "gpt-4o-mini", 0.7, 20, Prompts::default())
    }

    #[test]
    fn test_build_messages_shape() {
        let engine = engine();
        let passages = vec!["excerpt one".to_string()];
        let history = vec![Turn::user("earlier question"), Turn::assistant("earlier answer")];

        let messages = engine
            .build_messages("new question", &passages, &history)
            .unwrap();

        // System, two history turns, and the new question.
        assert_eq!(messages.len(), 4);
        assert!(matches!(
            messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(
            messages[2],
            ChatCompletionRequestMessage::Assistant(_)
        ));
        assert!(matches!(messages[3], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_build_messages_windows_long_history() {
        let engine = AnswerEngine::new(create_client(), "gpt-4o-mini", 0.7, 4, Prompts::default());

        let mut history = Vec::new();
        for i in 0..10 {
            history.push(Turn::user(format!("question {}", i)));
            history.push(Turn::assistant(format!("answer {}", i)));
        }

        let messages = engine.build_messages("latest", &[], &history).unwrap();

        // System + 4 windowed turns + the new question.
        assert_eq!(messages.len(), 6);
    }
}
