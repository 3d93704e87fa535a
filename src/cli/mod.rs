//! CLI module for Svar.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - Question answering over video transcripts
///
/// Load a YouTube video's captions into a local vector index and ask
/// questions about the content. The name "Svar" comes from the
/// Norwegian/Scandinavian word for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Svar and verify configuration
    Init,

    /// Fetch a video's captions and build its index
    Load {
        /// YouTube URL or video ID
        video: String,
    },

    /// Ask a question about an indexed video
    Ask {
        /// YouTube video ID (must be loaded first)
        video: String,

        /// The question to ask
        question: String,
    },

    /// List indexed videos
    List,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
