//! Serve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::server;
use anyhow::Result;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings)?;

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}:{}", host, port));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Load", "GET  /v01/rest/load/:video_id");
    Output::kv("Query", "POST /v01/rest/query/:video_id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(orchestrator, &host, port).await
}
