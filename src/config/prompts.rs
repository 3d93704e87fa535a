//! Prompt templates for Svar.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
}


/// Prompts for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// System message template. Receives the retrieved excerpts as
    /// `{{context}}`.
    pub system: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that answers questions about a video's spoken content.

Guidelines:
- Answer ONLY from the transcript excerpts provided below
- If the excerpts do not contain the information needed, say you don't know rather than guessing
- Be concise but complete

Transcript excerpts:
{{context}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Render a template, replacing `{{name}}` placeholders with the given
    /// variables.
    pub fn render(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut rendered = template.to_string();
        for (name, value) in vars {
            rendered = rendered.replace(&format!("{{{{{}}}}}", name), value);
        }
        rendered
    }
}
