//! HTTP API exposing the load and query operations.
//!
//! Routes follow the `/v01/rest` prefix expected by the web client.

use crate::error::SvarError;
use crate::history::Turn;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Build the application router.
pub fn router(orchestrator: Orchestrator, allowed_origin: Option<&str>) -> Router {
    let origin = match allowed_origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("Invalid CORS origin {:?}, allowing any origin", origin);
                AllowOrigin::any()
            }
        },
        None => AllowOrigin::any(),
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(AppState { orchestrator });

    Router::new()
        .route("/health", get(health))
        .route("/v01/rest/load/{video_id}", get(load))
        .route("/v01/rest/query/{video_id}", post(query))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(orchestrator: Orchestrator, host: &str, port: u16) -> anyhow::Result<()> {
    let allowed_origin = orchestrator.settings().server.allowed_origin.clone();
    let app = router(orchestrator, allowed_origin.as_deref());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct LoadResponse {
    message: String,
    history: Vec<Turn>,
}

#[derive(Deserialize)]
struct QueryRequest {
    question: String,
}

#[derive(Serialize)]
struct QueryResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn load(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Response {
    match state.orchestrator.load(&video_id).await {
        Ok(outcome) => {
            let (status, message) = if outcome.skipped {
                (
                    StatusCode::OK,
                    format!("Transcript {} already loaded", outcome.video_id),
                )
            } else {
                (
                    StatusCode::CREATED,
                    format!("Transcript {} loaded successfully", outcome.video_id),
                )
            };
            (
                status,
                Json(LoadResponse {
                    message,
                    history: outcome.history,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn query(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    Json(req): Json<QueryRequest>,
) -> Response {
    match state.orchestrator.query(&video_id, &req.question).await {
        Ok(answer) => Json(QueryResponse { message: answer }).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: SvarError) -> Response {
    let status = if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}
