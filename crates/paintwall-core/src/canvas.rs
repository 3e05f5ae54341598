//! Client-side view of the shared canvas.
//!
//! The [`Canvas`] owns the local copy of the stroke log and the surface it is
//! drawn on. Locally created events are appended and rendered immediately,
//! then queued for submission; the caller drains the queue with
//! [`Canvas::take_outgoing`] and sends the events however it likes. Each
//! snapshot fetched from the server replaces the local view wholesale, so an
//! optimistic event the server has not confirmed yet disappears until a later
//! snapshot contains it.

use crate::event::{Clock, DrawEvent, Stencil, StencilKind, Stroke, SystemClock};
use crate::geometry::{from_pixel, to_pixel};
use crate::session::{BrushStyle, DrawingSession, PressAction, ToolKind};
use crate::surface::{Surface, redraw, render_event};
use crate::sync::TransportResult;
use kurbo::Point;

/// Local replica of the shared stroke log plus in-progress drawing state.
pub struct Canvas<S: Surface> {
    surface: S,
    /// Last snapshot plus optimistic local events.
    view: Vec<DrawEvent>,
    session: DrawingSession,
    /// Locally created events awaiting submission.
    outgoing: Vec<DrawEvent>,
    clock: Box<dyn Clock>,
    /// Set on teardown; later snapshots are discarded.
    stopped: bool,
}

impl<S: Surface> Canvas<S> {
    /// Create an empty canvas drawing onto `surface`.
    pub fn new(surface: S) -> Self {
        Self::with_clock(surface, Box::new(SystemClock))
    }

    pub fn with_clock(surface: S, clock: Box<dyn Clock>) -> Self {
        Self {
            surface,
            view: Vec::new(),
            session: DrawingSession::new(),
            outgoing: Vec::new(),
            clock,
            stopped: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The events currently shown, oldest first.
    pub fn view(&self) -> &[DrawEvent] {
        &self.view
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.session.set_tool(tool);
    }

    pub fn set_style(&mut self, style: BrushStyle) {
        self.session.style = style;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Tear down: snapshots applied after this are ignored.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Accept snapshots again after [`Canvas::stop`].
    pub fn resume(&mut self) {
        self.stopped = false;
    }

    fn normalize(&self, pixel: Point) -> Option<Point> {
        from_pixel(pixel, self.surface.viewport())
    }

    /// Pointer pressed at a pixel position.
    pub fn pointer_down(&mut self, pixel: Point) {
        let Some(point) = self.normalize(pixel) else {
            return;
        };
        match self.session.press(point) {
            PressAction::StrokeStarted(point) => {
                let viewport = self.surface.viewport();
                let style = &self.session.style;
                self.surface
                    .draw_segment(&[to_pixel(point, viewport)], &style.color, style.size);
            }
            PressAction::Stamp(position) => {
                let event = DrawEvent::Stencil(Stencil {
                    id: self.clock.next_id(),
                    created_at: self.clock.now_millis(),
                    kind: StencilKind::Stencil,
                    position,
                    color: self.session.style.color.clone(),
                });
                self.commit(event);
            }
            PressAction::Ignored => {}
        }
    }

    /// Pointer moved to a pixel position.
    pub fn pointer_move(&mut self, pixel: Point) {
        let Some(point) = self.normalize(pixel) else {
            return;
        };
        if let Some(segment) = self.session.extend(point) {
            let viewport = self.surface.viewport();
            let style = &self.session.style;
            let pixels = segment.map(|p| to_pixel(p, viewport));
            self.surface.draw_segment(&pixels, &style.color, style.size);
        }
    }

    /// Pointer released over the canvas.
    pub fn pointer_up(&mut self) {
        self.finish_stroke();
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.finish_stroke();
    }

    fn finish_stroke(&mut self) {
        let Some(points) = self.session.release() else {
            return;
        };
        let event = DrawEvent::Stroke(Stroke {
            id: self.clock.next_id(),
            created_at: self.clock.now_millis(),
            points,
            color: self.session.style.color.clone(),
            size: self.session.style.size,
        });
        // The segments are already on screen.
        self.view.push(event.clone());
        self.outgoing.push(event);
    }

    /// Append, render and queue a new local event.
    fn commit(&mut self, event: DrawEvent) {
        render_event(&mut self.surface, &event);
        self.view.push(event.clone());
        self.outgoing.push(event);
    }

    /// Drain events created locally since the last call.
    pub fn take_outgoing(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.outgoing)
    }

    /// Apply the outcome of a snapshot fetch.
    ///
    /// On success the local view is replaced and fully redrawn. A failed fetch
    /// leaves the current view in place. Returns whether the view changed.
    pub fn apply_snapshot(&mut self, result: TransportResult<Vec<DrawEvent>>) -> bool {
        if self.stopped {
            return false;
        }
        match result {
            Ok(events) => {
                self.view = events;
                self.redraw();
                true
            }
            Err(e) => {
                log::debug!("Keeping stale view, snapshot fetch failed: {}", e);
                false
            }
        }
    }

    /// Redraw the whole view, e.g. after the viewport was resized.
    pub fn redraw(&mut self) {
        redraw(&mut self.surface, &self.view);
    }
}
