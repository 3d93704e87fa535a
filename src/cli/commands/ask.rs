//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(video: &str, question: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching transcript...");

    match orchestrator.query(video, question).await {
        Ok(answer) => {
            spinner.finish_and_clear();

            println!("\n{}\n", answer);

            let history = orchestrator.history(video).await?;
            Output::kv("Conversation turns", &history.len().to_string());
        }
        Err(e) => {
            spinner.finish_and_clear();
            if e.is_not_found() {
                Output::error(&format!("{}", e));
                Output::info(&format!("Load it first: svar load {}", video));
            } else {
                Output::error(&format!("Failed to generate answer: {}", e));
            }
            return Err(e.into());
        }
    }

    Ok(())
}
