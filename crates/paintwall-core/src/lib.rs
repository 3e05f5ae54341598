//! PaintWall Core Library
//!
//! Data model, validation and synchronization logic for a shared drawing
//! surface: a bounded, append-only stroke log on the server and a polling,
//! optimistically updated replica of it on each client.

pub mod canvas;
pub mod event;
pub mod geometry;
pub mod ingest;
pub mod session;
pub mod store;
pub mod surface;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use canvas::Canvas;
pub use event::{Clock, DEFAULT_COLOR, DEFAULT_SIZE, DrawEvent, Stencil, StencilKind, Stroke, SystemClock};
pub use geometry::{InvalidPosition, normalize_point, normalize_position};
pub use ingest::{Candidate, IngestError, IngestFailure, ingest};
pub use session::{BrushStyle, DrawingSession, ToolKind, ToolState};
pub use store::{DEFAULT_MAX_STROKES, MemoryStrokeStore, StoreError, StoreResult, StrokeStore};
pub use surface::{DrawCall, RecordingSurface, Surface};
pub use sync::{
    LocalTransport, SnapshotResponse, StrokeTransport, SubmitAck, SubmitRequest, TransportError,
    TransportResult,
};

pub use kurbo::{Point, Size};
