//! Wire messages and the client transport seam.
//!
//! Clients talk to the store through two operations: submit a single event and
//! fetch the whole snapshot. [`StrokeTransport`] abstracts how those reach the
//! server so the reconciliation logic can run against HTTP or in-process.

use crate::event::{Clock, DrawEvent, SystemClock};
use crate::ingest::{IngestFailure, ingest};
use crate::store::{BoxFuture, StrokeStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Body of `GET /strokes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub strokes: Vec<DrawEvent>,
}

/// Body of `POST /strokes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub stroke: DrawEvent,
}

/// Successful reply to `POST /strokes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub ok: bool,
}

impl SubmitAck {
    pub const OK: SubmitAck = SubmitAck { ok: true };
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Server responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Connection from a client to the shared stroke store.
pub trait StrokeTransport: Send + Sync {
    /// Fetch the full current snapshot.
    fn fetch_snapshot(&self) -> BoxFuture<'_, TransportResult<Vec<DrawEvent>>>;

    /// Submit one event for ingestion.
    fn submit(&self, event: DrawEvent) -> BoxFuture<'_, TransportResult<()>>;
}

/// Decode a snapshot body.
///
/// A body without a `strokes` array is an error, not an empty canvas, so a
/// misbehaving server cannot wipe a client's view.
pub fn decode_snapshot(body: &[u8]) -> TransportResult<Vec<DrawEvent>> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| TransportError::Decode(e.to_string()))?;
    if !value.get("strokes").is_some_and(Value::is_array) {
        return Err(TransportError::Decode("missing strokes array".to_string()));
    }
    let response: SnapshotResponse =
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))?;
    Ok(response.strokes)
}

/// Transport that talks to a store in the same process.
pub struct LocalTransport {
    store: Arc<dyn StrokeStore>,
    clock: Arc<dyn Clock>,
}

impl LocalTransport {
    pub fn new(store: Arc<dyn StrokeStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn StrokeStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl StrokeTransport for LocalTransport {
    fn fetch_snapshot(&self) -> BoxFuture<'_, TransportResult<Vec<DrawEvent>>> {
        Box::pin(async move {
            self.store
                .snapshot()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))
        })
    }

    fn submit(&self, event: DrawEvent) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            // Go through the same validation as a network submission.
            let payload = serde_json::to_value(SubmitRequest { stroke: event })
                .map_err(|e| TransportError::Request(e.to_string()))?;
            match ingest(self.store.as_ref(), self.clock.as_ref(), &payload).await {
                Ok(_) => Ok(()),
                Err(IngestFailure::Rejected(e)) => Err(TransportError::Status {
                    status: 400,
                    message: e.to_string(),
                }),
                Err(IngestFailure::Store(e)) => Err(TransportError::Request(e.to_string())),
            }
        })
    }
}
