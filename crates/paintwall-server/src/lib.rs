//! PaintWall Stroke Server
//!
//! Holds the shared stroke log in memory and exposes it over HTTP.
//!
//! ## Protocol
//!
//! ```text
//! GET  /strokes                     -> 200 {"strokes": [DrawEvent, ...]}
//! POST /strokes  {"stroke": {...}}  -> 200 {"ok": true}
//!                                   -> 400 "Missing stroke" | "Invalid stencil position"
//!                                          | "Invalid stroke format" | "Stroke too short"
//!                                   -> 500 "Failed to save stroke"
//! ```
//!
//! The same routes are served under `/api/strokes`.

pub mod config;

pub use config::{ConfigError, ServerConfig};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use paintwall_core::{
    Clock, IngestError, IngestFailure, MemoryStrokeStore, SnapshotResponse, StrokeStore, SubmitAck,
    SystemClock, ingest,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] IngestError),
    #[error("Failed to save stroke")]
    SaveFailed,
    #[error("Failed to load strokes")]
    LoadFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::SaveFailed | ApiError::LoadFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Shared application state
pub struct AppState {
    store: Arc<dyn StrokeStore>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn StrokeStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn StrokeStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(max_strokes: usize) -> Self {
        Self::new(Arc::new(MemoryStrokeStore::with_capacity(max_strokes)))
    }
}

/// Build the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/strokes", get(list_strokes).post(add_stroke))
        .route("/api/strokes", get(list_strokes).post(add_stroke))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until interrupted.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::in_memory(config.max_strokes));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("PaintWall server listening on {}", config.addr);
    info!("Retaining up to {} strokes", config.max_strokes);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Index page
async fn index() -> &'static str {
    "PaintWall Stroke Server - GET or POST /strokes"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Full snapshot of the store.
async fn list_strokes(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let strokes = state.store.snapshot().await.map_err(|e| {
        warn!("Snapshot failed: {}", e);
        ApiError::LoadFailed
    })?;
    debug!("Serving snapshot of {} events", strokes.len());
    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(SnapshotResponse { strokes }),
    )
        .into_response())
}

/// Validate and append one event.
async fn add_stroke(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SubmitAck>, ApiError> {
    // Numbers keep their text, so an out-of-range coordinate reaches point
    // validation instead of failing the whole body.
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Unparseable stroke body: {}", e);
        ApiError::SaveFailed
    })?;

    match ingest(state.store.as_ref(), state.clock.as_ref(), &payload).await {
        Ok(event) => {
            debug!("Accepted event {}", event.id());
            Ok(Json(SubmitAck::OK))
        }
        Err(IngestFailure::Rejected(e)) => {
            debug!("Rejected event: {}", e);
            Err(e.into())
        }
        Err(IngestFailure::Store(e)) => {
            warn!("Failed to append event: {}", e);
            Err(ApiError::SaveFailed)
        }
    }
}
