//! Transcript HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Plain-text usage |
//! | `GET`  | `/api/health` | Health check |
//! | `GET`  | `/api/transcript?v=<id or url>&lang=<code or auto>` | Fetch a transcript |
//!
//! # Status codes
//!
//! `200` for a transcript, for "no caption tracks listed" and for "no captions
//! available"; `400` for an unusable identifier; `451` when the upstream served a
//! consent/region interstitial; `500` for anything else.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::transcript::{TranscriptPipeline, TranscriptResponse};
use crate::TranscriptError;

const INVALID_ID_MESSAGE: &str = "Missing or invalid ?v=<videoId or YouTube URL>";

const USAGE: &str = "YTScribe API

Try:
/api/health
/api/transcript?v=<VIDEO_ID>&lang=auto
";

#[derive(Debug, Deserialize)]
struct TranscriptQuery {
    v: Option<String>,
    lang: Option<String>,
}

/// Build the router over an existing pipeline
pub fn router(pipeline: TranscriptPipeline) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/api/health", get(handle_health))
        .route("/api/transcript", get(handle_transcript))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Bind and serve until the process is terminated
pub async fn run_server(config: &Config, bind: &str, port: u16) -> anyhow::Result<()> {
    let pipeline = TranscriptPipeline::new(config)?;
    let app = router(pipeline);

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_root() -> &'static str {
    USAGE
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn handle_transcript(
    State(pipeline): State<TranscriptPipeline>,
    Query(query): Query<TranscriptQuery>,
) -> Response {
    let raw = query.v.unwrap_or_default();

    match pipeline.get_transcript(&raw, query.lang.as_deref()).await {
        Ok(result) => (StatusCode::OK, Json(result.to_response())).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(error: TranscriptError) -> Response {
    let (status, message) = match &error {
        TranscriptError::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, INVALID_ID_MESSAGE.to_string()),
        TranscriptError::RegionGated => (StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS, error.to_string()),
        _ => {
            tracing::error!("Transcript request failed: {}", error);
            (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    };

    (status, Json(TranscriptResponse::failure(message))).into_response()
}
