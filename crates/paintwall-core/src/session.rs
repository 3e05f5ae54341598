//! Pointer interaction state for a single drawer.

use crate::event::{DEFAULT_COLOR, DEFAULT_SIZE};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// Freehand brush: press, drag, release.
    #[default]
    Brush,
    /// Stamps a stencil on press, no drag phase.
    Stencil,
}

/// State of a pointer interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolState {
    /// No active stroke.
    #[default]
    Idle,
    /// A brush stroke is in progress.
    Drawing {
        /// Normalized points collected so far.
        points: Vec<Point>,
    },
}

/// Brush settings applied to new events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrushStyle {
    pub color: String,
    pub size: f64,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            size: DEFAULT_SIZE,
        }
    }
}

/// Outcome of a pointer press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressAction {
    /// A stroke began at this point.
    StrokeStarted(Point),
    /// A stencil should be stamped here; the session stays idle.
    Stamp(Point),
    /// Ignored because a stroke is already in progress.
    Ignored,
}

/// Tracks the current tool and the stroke being drawn.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Style applied to new events.
    pub style: BrushStyle,
    state: ToolState,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, ToolState::Drawing { .. })
    }

    /// Switch tools, abandoning any stroke in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Handle a pointer press at a normalized point.
    pub fn press(&mut self, point: Point) -> PressAction {
        if self.is_drawing() {
            return PressAction::Ignored;
        }
        match self.current_tool {
            ToolKind::Stencil => PressAction::Stamp(point),
            ToolKind::Brush => {
                self.state = ToolState::Drawing {
                    points: vec![point],
                };
                PressAction::StrokeStarted(point)
            }
        }
    }

    /// Extend the stroke in progress.
    ///
    /// Returns the newest two-point segment, or `None` when idle.
    pub fn extend(&mut self, point: Point) -> Option<[Point; 2]> {
        match &mut self.state {
            ToolState::Drawing { points } => {
                let previous = *points.last()?;
                points.push(point);
                Some([previous, point])
            }
            ToolState::Idle => None,
        }
    }

    /// End the stroke in progress.
    ///
    /// Returns its points if there are enough to form a stroke; a shorter
    /// buffer is discarded.
    pub fn release(&mut self) -> Option<Vec<Point>> {
        match std::mem::take(&mut self.state) {
            ToolState::Drawing { points } if points.len() >= 2 => Some(points),
            _ => None,
        }
    }
}
