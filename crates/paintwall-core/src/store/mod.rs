//! Stroke store abstraction.

mod memory;

pub use memory::MemoryStrokeStore;

use crate::event::DrawEvent;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Number of events retained by default.
pub const DEFAULT_MAX_STROKES: usize = 5000;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Ordered, bounded log of draw events shared by every client.
///
/// Insertion order is arrival order. Once more than `capacity()` events have
/// been appended the oldest ones are dropped, so a snapshot always holds the
/// most recent events in arrival order.
pub trait StrokeStore: Send + Sync {
    /// Append an event, evicting the oldest entries past capacity.
    fn append(&self, event: DrawEvent) -> BoxFuture<'_, StoreResult<()>>;

    /// Copy of the current contents, oldest first.
    fn snapshot(&self) -> BoxFuture<'_, StoreResult<Vec<DrawEvent>>>;

    /// Number of events currently held.
    fn len(&self) -> BoxFuture<'_, StoreResult<usize>>;

    /// Maximum number of events retained.
    fn capacity(&self) -> usize;
}
