//! Load command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the load command.
pub async fn run_load(video: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching captions and building index...");

    match orchestrator.load(video).await {
        Ok(outcome) => {
            spinner.finish_and_clear();

            if outcome.skipped {
                Output::info(&format!(
                    "Video {} is already indexed ({} history turns).",
                    outcome.video_id,
                    outcome.history.len()
                ));
            } else {
                Output::success(&format!(
                    "Indexed {} in {} chunks.",
                    outcome.video_id, outcome.chunks_indexed
                ));
                Output::info(&format!(
                    "Ask away: svar ask {} \"<question>\"",
                    outcome.video_id
                ));
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to load video: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
