//! Configuration module for Svar.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, RagSettings, ServerSettings, Settings,
    TranscriptSettings,
};
