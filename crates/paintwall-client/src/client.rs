//! Asynchronous driver for a [`Canvas`].
//!
//! The canvas itself is synchronous. [`DrawingClient`] wraps it in a mutex,
//! forwards pointer input, submits the events the canvas queues, and runs the
//! periodic snapshot poll on a Tokio runtime. The lock is never held across an
//! `.await`.

use crate::config::ClientConfig;
use paintwall_core::{Canvas, DrawEvent, Point, StrokeTransport, Surface, ToolKind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("DrawingClient must be created inside a Tokio runtime")]
    NoRuntime,
}

/// Submissions spawned by one input event.
///
/// Dropping this detaches the tasks; they still run to completion.
#[derive(Debug, Default)]
pub struct Submissions(Vec<JoinHandle<()>>);

impl Submissions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Wait until every submission has finished, successfully or not.
    pub async fn settle(self) {
        for handle in self.0 {
            let _ = handle.await;
        }
    }
}

fn lock<S: Surface>(canvas: &Mutex<Canvas<S>>) -> MutexGuard<'_, Canvas<S>> {
    canvas.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A canvas connected to a stroke server.
pub struct DrawingClient<S: Surface + Send + 'static> {
    canvas: Arc<Mutex<Canvas<S>>>,
    transport: Arc<dyn StrokeTransport>,
    poll_interval: Duration,
    runtime: Handle,
    poller: Option<JoinHandle<()>>,
}

impl<S: Surface + Send + 'static> DrawingClient<S> {
    /// Create a client drawing onto `surface`.
    ///
    /// Must be called from within a Tokio runtime; input methods may then be
    /// called from any thread.
    pub fn new(
        surface: S,
        transport: Arc<dyn StrokeTransport>,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let mut canvas = Canvas::new(surface);
        canvas.set_style(config.style.clone());
        Self::from_canvas(canvas, transport, config.poll_interval)
    }

    pub fn from_canvas(
        canvas: Canvas<S>,
        transport: Arc<dyn StrokeTransport>,
        poll_interval: Duration,
    ) -> Result<Self, ClientError> {
        let runtime = Handle::try_current().map_err(|_| ClientError::NoRuntime)?;
        Ok(Self {
            canvas: Arc::new(Mutex::new(canvas)),
            transport,
            poll_interval,
            runtime,
            poller: None,
        })
    }

    /// Run `f` against the canvas, then submit anything it queued.
    pub fn with_canvas<R>(&self, f: impl FnOnce(&mut Canvas<S>) -> R) -> (R, Submissions) {
        let (result, outgoing) = {
            let mut canvas = lock(&self.canvas);
            let result = f(&mut canvas);
            (result, canvas.take_outgoing())
        };
        // Rendering happened under the lock above, before any request is issued.
        (result, self.dispatch(outgoing))
    }

    fn dispatch(&self, events: Vec<DrawEvent>) -> Submissions {
        let handles = events
            .into_iter()
            .map(|event| {
                let transport = self.transport.clone();
                self.runtime.spawn(async move {
                    let id = event.id();
                    // Fire and forget: a lost event is repaired, or dropped,
                    // by the next snapshot.
                    if let Err(e) = transport.submit(event).await {
                        log::debug!("Event {} was not stored: {}", id, e);
                    }
                })
            })
            .collect();
        Submissions(handles)
    }

    pub fn pointer_down(&self, pixel: Point) -> Submissions {
        self.with_canvas(|c| c.pointer_down(pixel)).1
    }

    pub fn pointer_move(&self, pixel: Point) {
        // Moves never complete an event.
        lock(&self.canvas).pointer_move(pixel);
    }

    pub fn pointer_up(&self) -> Submissions {
        self.with_canvas(|c| c.pointer_up()).1
    }

    pub fn pointer_leave(&self) -> Submissions {
        self.with_canvas(|c| c.pointer_leave()).1
    }

    pub fn set_tool(&self, tool: ToolKind) {
        lock(&self.canvas).set_tool(tool);
    }

    /// Redraw after the surface changed size.
    pub fn resize(&self, resize_surface: impl FnOnce(&mut S)) {
        let mut canvas = lock(&self.canvas);
        resize_surface(canvas.surface_mut());
        canvas.redraw();
    }

    /// Copy of the events currently shown.
    pub fn view(&self) -> Vec<DrawEvent> {
        lock(&self.canvas).view().to_vec()
    }

    /// Fetch one snapshot and apply it. Returns whether the view was replaced.
    pub async fn poll_now(&self) -> bool {
        poll_once(&self.canvas, self.transport.as_ref()).await
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the periodic snapshot poll. The first fetch happens immediately.
    ///
    /// A stopped client may be started again.
    pub fn start(&mut self) {
        if self.is_polling() {
            return;
        }
        lock(&self.canvas).resume();
        let canvas = self.canvas.clone();
        let transport = self.transport.clone();
        let period = self.poll_interval;
        self.poller = Some(self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if lock(&canvas).is_stopped() {
                    break;
                }
                poll_once(&canvas, transport.as_ref()).await;
            }
        }));
        log::info!("Polling for snapshots every {:?}", period);
    }

    /// Stop polling. A fetch already in flight is discarded when it lands.
    pub fn stop(&mut self) {
        lock(&self.canvas).stop();
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl<S: Surface + Send + 'static> Drop for DrawingClient<S> {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

async fn poll_once<S: Surface>(canvas: &Mutex<Canvas<S>>, transport: &dyn StrokeTransport) -> bool {
    let result = transport.fetch_snapshot().await;
    lock(canvas).apply_snapshot(result)
}
