//! Normalized canvas coordinates.
//!
//! Every point stored or exchanged by PaintWall lives in the unit square,
//! relative to the drawing container. Coordinates coming from the network are
//! untrusted JSON and are coerced and range-checked here before they reach the
//! store.

use kurbo::{Point, Size};
use serde_json::Value;
use thiserror::Error;

/// A single stencil position failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("position is missing or outside the unit square")]
pub struct InvalidPosition;

/// Check that a coordinate is finite and within `[0, 1]`.
pub fn is_unit(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

/// Coerce an untrusted JSON value to a number.
///
/// Numbers pass through. Strings are parsed after trimming, with a blank
/// string reading as zero. Booleans read as 1/0 and `null` as zero. Anything
/// else yields NaN, which every range check rejects.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn coerce_field(raw: &Value, key: &str) -> f64 {
    raw.get(key).map(coerce_number).unwrap_or(f64::NAN)
}

/// Normalize one point of a stroke.
///
/// Returns `None` when the point should be filtered out of the sequence.
pub fn normalize_point(raw: &Value) -> Option<Point> {
    if !raw.is_object() {
        return None;
    }
    let x = coerce_field(raw, "x");
    let y = coerce_field(raw, "y");
    (is_unit(x) && is_unit(y)).then(|| Point::new(x, y))
}

/// Normalize the single position of a stencil placement.
pub fn normalize_position(raw: &Value) -> Result<Point, InvalidPosition> {
    normalize_point(raw).ok_or(InvalidPosition)
}

/// Convert a pointer position in pixels to normalized coordinates.
///
/// Returns `None` for a degenerate viewport. The result is not clamped: a
/// pointer dragged past the edge yields coordinates outside the unit square,
/// which the server filters.
pub fn from_pixel(pixel: Point, viewport: Size) -> Option<Point> {
    if !(viewport.width > 0.0 && viewport.height > 0.0) {
        return None;
    }
    Some(Point::new(pixel.x / viewport.width, pixel.y / viewport.height))
}

/// Scale a normalized point to pixels for a viewport.
pub fn to_pixel(point: Point, viewport: Size) -> Point {
    Point::new(point.x * viewport.width, point.y * viewport.height)
}
