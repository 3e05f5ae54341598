//! Draw events: the unit of data stored on the shared canvas.

use kurbo::Point;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Color used when a caller supplies none.
pub const DEFAULT_COLOR: &str = "#000000";

/// Brush size used when a caller supplies none.
pub const DEFAULT_SIZE: f64 = 3.0;

/// Largest magnitude below which every integer is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Write integral values without a fractional part, so `1712345678901`
/// comes back as it was sent rather than as `1712345678901.0`.
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// A freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    #[serde(serialize_with = "serialize_number")]
    pub id: f64,
    #[serde(serialize_with = "serialize_number")]
    pub created_at: f64,
    /// Normalized points, at least two.
    pub points: Vec<Point>,
    pub color: String,
    #[serde(serialize_with = "serialize_number")]
    pub size: f64,
}

/// Discriminator carried on the wire by stencil events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StencilKind {
    #[default]
    Stencil,
}

/// A stencil stamped at a single position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stencil {
    #[serde(serialize_with = "serialize_number")]
    pub id: f64,
    #[serde(serialize_with = "serialize_number")]
    pub created_at: f64,
    #[serde(rename = "type")]
    pub kind: StencilKind,
    pub position: Point,
    pub color: String,
}

/// A single drawing action on the shared canvas.
///
/// Strokes serialize without a `type` field; stencils carry
/// `"type": "stencil"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DrawEvent {
    Stencil(Stencil),
    Stroke(Stroke),
}

impl<'de> Deserialize<'de> for DrawEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Buffered as a `Value` rather than through untagged content, which
        // cannot hold arbitrary-precision numbers.
        let value = Value::deserialize(deserializer)?;
        let event = if value.get("type").and_then(Value::as_str) == Some("stencil") {
            serde_json::from_value(value).map(DrawEvent::Stencil)
        } else {
            serde_json::from_value(value).map(DrawEvent::Stroke)
        };
        event.map_err(D::Error::custom)
    }
}

impl DrawEvent {
    pub fn id(&self) -> f64 {
        match self {
            DrawEvent::Stencil(s) => s.id,
            DrawEvent::Stroke(s) => s.id,
        }
    }

    pub fn color(&self) -> &str {
        match self {
            DrawEvent::Stencil(s) => &s.color,
            DrawEvent::Stroke(s) => &s.color,
        }
    }

    pub fn is_stencil(&self) -> bool {
        matches!(self, DrawEvent::Stencil(_))
    }
}

impl From<Stroke> for DrawEvent {
    fn from(stroke: Stroke) -> Self {
        DrawEvent::Stroke(stroke)
    }
}

impl From<Stencil> for DrawEvent {
    fn from(stencil: Stencil) -> Self {
        DrawEvent::Stencil(stencil)
    }
}

/// Source of timestamps and id tiebreaks.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> f64;

    /// A random fraction in `[0, 1)` mixed into synthesized ids.
    fn tiebreak(&self) -> f64;

    /// Synthesize an event id from the current time and a random fraction.
    fn next_id(&self) -> f64 {
        self.now_millis() + self.tiebreak()
    }
}

/// Wall-clock time with uuid-backed randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    fn tiebreak(&self) -> f64 {
        // The top 48 bits of a v4 uuid are all random.
        let bits = (Uuid::new_v4().as_u128() >> 80) as u64;
        bits as f64 / (1u64 << 48) as f64
    }
}
