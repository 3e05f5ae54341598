//! Rendering seam.
//!
//! PaintWall does not rasterize anything itself. A [`Surface`] provides the
//! two primitives the canvas needs, drawing a polyline and stamping a stencil
//! image, in pixel coordinates of the current viewport.

use crate::event::DrawEvent;
use crate::geometry::to_pixel;
use kurbo::{Point, Size};

/// A raster target the canvas draws onto.
pub trait Surface {
    /// Current viewport size in logical pixels.
    fn viewport(&self) -> Size;

    /// Erase everything.
    fn clear(&mut self);

    /// Draw a round-capped polyline through `points`.
    ///
    /// A single point draws a dot.
    fn draw_segment(&mut self, points: &[Point], color: &str, width: f64);

    /// Stamp the stencil image centred on `center`.
    fn stamp(&mut self, center: Point, color: &str);
}

/// Render one event at the surface's current size.
pub fn render_event<S: Surface + ?Sized>(surface: &mut S, event: &DrawEvent) {
    let viewport = surface.viewport();
    match event {
        DrawEvent::Stroke(stroke) => {
            let points: Vec<Point> = stroke.points.iter().map(|p| to_pixel(*p, viewport)).collect();
            surface.draw_segment(&points, &stroke.color, stroke.size);
        }
        DrawEvent::Stencil(stencil) => {
            surface.stamp(to_pixel(stencil.position, viewport), &stencil.color);
        }
    }
}

/// Clear the surface and render every event in order.
pub fn redraw<S: Surface + ?Sized>(surface: &mut S, events: &[DrawEvent]) {
    surface.clear();
    for event in events {
        render_event(surface, event);
    }
}

/// A primitive issued to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    Segment {
        points: Vec<Point>,
        color: String,
        width: f64,
    },
    Stamp {
        center: Point,
        color: String,
    },
}

/// Headless surface that records the primitives it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    viewport: Size,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            calls: Vec::new(),
        }
    }

    /// Change the viewport, as a window resize would.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the log empty.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    /// Calls issued since the last clear.
    pub fn visible_calls(&self) -> &[DrawCall] {
        let start = self
            .calls
            .iter()
            .rposition(|c| matches!(c, DrawCall::Clear))
            .map_or(0, |i| i + 1);
        &self.calls[start..]
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn draw_segment(&mut self, points: &[Point], color: &str, width: f64) {
        self.calls.push(DrawCall::Segment {
            points: points.to_vec(),
            color: color.to_string(),
            width,
        });
    }

    fn stamp(&mut self, center: Point, color: &str) {
        self.calls.push(DrawCall::Stamp {
            center,
            color: color.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Stencil, StencilKind, Stroke};

    #[test]
    fn test_redraw_scales_to_viewport() {
        let events = vec![
            DrawEvent::Stroke(Stroke {
                id: 1.0,
                created_at: 1.0,
                points: vec![Point::new(0.0, 0.0), Point::new(0.5, 1.0)],
                color: "#000000".to_string(),
                size: 3.0,
            }),
            DrawEvent::Stencil(Stencil {
                id: 2.0,
                created_at: 2.0,
                kind: StencilKind::Stencil,
                position: Point::new(0.25, 0.5),
                color: "#ff00ff".to_string(),
            }),
        ];
        let mut surface = RecordingSurface::new(Size::new(400.0, 200.0));
        redraw(&mut surface, &events);

        assert_eq!(
            surface.calls(),
            &[
                DrawCall::Clear,
                DrawCall::Segment {
                    points: vec![Point::new(0.0, 0.0), Point::new(200.0, 200.0)],
                    color: "#000000".to_string(),
                    width: 3.0,
                },
                DrawCall::Stamp {
                    center: Point::new(100.0, 100.0),
                    color: "#ff00ff".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_visible_calls() {
        let mut surface = RecordingSurface::new(Size::new(10.0, 10.0));
        surface.stamp(Point::ZERO, "#000000");
        surface.clear();
        surface.stamp(Point::new(1.0, 1.0), "#000000");
        assert_eq!(surface.visible_calls().len(), 1);
    }
}
