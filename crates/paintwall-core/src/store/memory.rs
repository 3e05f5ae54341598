//! In-memory stroke store.

use super::{BoxFuture, DEFAULT_MAX_STROKES, StoreError, StoreResult, StrokeStore};
use crate::event::DrawEvent;
use std::collections::VecDeque;
use std::sync::RwLock;

/// Volatile store living for the lifetime of the process.
///
/// Append and eviction happen under a single write lock, so concurrent
/// appends can neither push the log past capacity nor lose the newest entry.
pub struct MemoryStrokeStore {
    events: RwLock<VecDeque<DrawEvent>>,
    capacity: usize,
}

impl MemoryStrokeStore {
    /// Create an empty store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_STROKES)
    }

    /// Create an empty store retaining at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_MAX_STROKES))),
            capacity,
        }
    }

    fn push(&self, event: DrawEvent) -> StoreResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        events.push_back(event);
        while events.len() > self.capacity {
            events.pop_front();
        }
        Ok(())
    }

    fn copy(&self) -> StoreResult<Vec<DrawEvent>> {
        let events = self
            .events
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(events.iter().cloned().collect())
    }
}

impl Default for MemoryStrokeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeStore for MemoryStrokeStore {
    fn append(&self, event: DrawEvent) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move { self.push(event) })
    }

    fn snapshot(&self) -> BoxFuture<'_, StoreResult<Vec<DrawEvent>>> {
        Box::pin(async move { self.copy() })
    }

    fn len(&self) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(async move {
            let events = self
                .events
                .read()
                .map_err(|e| StoreError::Lock(e.to_string()))?;
            Ok(events.len())
        })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::block_on;
    use crate::event::Stroke;
    use kurbo::Point;
    use std::sync::Arc;

    fn stroke(id: f64) -> DrawEvent {
        DrawEvent::Stroke(Stroke {
            id,
            created_at: id,
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            color: "#000000".to_string(),
            size: 3.0,
        })
    }

    #[test]
    fn test_empty_snapshot() {
        let store = MemoryStrokeStore::new();
        assert!(block_on(store.snapshot()).unwrap().is_empty());
        assert_eq!(store.capacity(), DEFAULT_MAX_STROKES);
    }

    #[test]
    fn test_append_preserves_order() {
        let store = MemoryStrokeStore::new();
        for i in 0..10 {
            block_on(store.append(stroke(i as f64))).unwrap();
        }
        let ids: Vec<f64> = block_on(store.snapshot()).unwrap().iter().map(DrawEvent::id).collect();
        assert_eq!(ids, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let store = MemoryStrokeStore::new();
        for i in 0..=DEFAULT_MAX_STROKES {
            block_on(store.append(stroke(i as f64))).unwrap();
        }
        let snapshot = block_on(store.snapshot()).unwrap();
        assert_eq!(snapshot.len(), DEFAULT_MAX_STROKES);
        assert_eq!(snapshot.first().map(DrawEvent::id), Some(1.0));
        assert_eq!(snapshot.last().map(DrawEvent::id), Some(DEFAULT_MAX_STROKES as f64));
        assert!(snapshot.windows(2).all(|w| w[0].id() < w[1].id()));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = MemoryStrokeStore::with_capacity(4);
        block_on(store.append(stroke(1.0))).unwrap();
        let mut snapshot = block_on(store.snapshot()).unwrap();
        snapshot.clear();
        assert_eq!(block_on(store.len()).unwrap(), 1);
    }

    #[test]
    fn test_consecutive_snapshots_identical() {
        let store = MemoryStrokeStore::new();
        for i in 0..5 {
            block_on(store.append(stroke(i as f64))).unwrap();
        }
        assert_eq!(block_on(store.snapshot()).unwrap(), block_on(store.snapshot()).unwrap());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let store = MemoryStrokeStore::with_capacity(0);
        block_on(store.append(stroke(1.0))).unwrap();
        block_on(store.append(stroke(2.0))).unwrap();
        let snapshot = block_on(store.snapshot()).unwrap();
        assert_eq!(snapshot, vec![stroke(2.0)]);
    }

    #[test]
    fn test_concurrent_appends_respect_capacity() {
        let store = Arc::new(MemoryStrokeStore::with_capacity(100));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        block_on(store.append(stroke((t * 1000 + i) as f64))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(block_on(store.len()).unwrap(), 100);
    }
}
