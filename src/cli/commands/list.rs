//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.index_store().list() {
        Ok(videos) => {
            if videos.is_empty() {
                Output::info("No videos indexed yet. Use 'svar load <video>' to add one.");
            } else {
                Output::header(&format!("Indexed Videos ({})", videos.len()));
                println!();

                for video in &videos {
                    Output::video_info(
                        &video.video_id,
                        video.chunk_count,
                        &video.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    );
                }

                let total_chunks: usize = videos.iter().map(|v| v.chunk_count).sum();
                println!();
                Output::kv("Total videos", &videos.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
