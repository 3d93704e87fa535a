//! Svar - Question answering over video transcripts
//!
//! Ask natural-language questions about a YouTube video's spoken content.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Load a video's caption track and build a searchable vector index from it
//! - Ask questions about the video and get answers grounded in the transcript
//! - Hold a multi-turn conversation per video, persisted across restarts
//! - Serve the load/query operations over a small REST API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Caption track acquisition
//! - `chunking` - Splitting transcripts into overlapping chunks
//! - `embedding` - Embedding generation
//! - `index` - Per-video vector index and its durable storage
//! - `history` - Persisted conversation history per video
//! - `rag` - Answer synthesis from retrieved context
//! - `orchestrator` - Pipeline coordination
//! - `server` - REST API surface
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     // Index a video's transcript, then ask about it
//!     let outcome = orchestrator.load("dQw4w9WgXcQ").await?;
//!     println!("Indexed {} chunks", outcome.chunks_indexed);
//!
//!     let answer = orchestrator.query("dQw4w9WgXcQ", "What is this video about?").await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod history;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod server;
pub mod transcript;

pub use error::{Result, SvarError};
