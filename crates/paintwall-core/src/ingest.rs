//! Validation of untrusted draw events before they enter the store.
//!
//! A submitted payload is parsed into a [`Candidate`], an explicit stroke or
//! stencil with every geometric field already normalized, or rejected with an
//! [`IngestError`]. Defaults for id, timestamp, color and size are filled in
//! when the candidate becomes a [`DrawEvent`].

use crate::event::{
    Clock, DEFAULT_COLOR, DEFAULT_SIZE, DrawEvent, Stencil, StencilKind, Stroke,
};
use crate::geometry::{normalize_point, normalize_position};
use crate::store::{StoreError, StrokeStore};
use kurbo::Point;
use serde_json::Value;
use thiserror::Error;

/// Why a submitted event was refused.
///
/// The messages are part of the HTTP contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("Missing stroke")]
    MissingStroke,
    #[error("Invalid stencil position")]
    InvalidStencilPosition,
    #[error("Invalid stroke format")]
    InvalidStrokeFormat,
    #[error("Stroke too short")]
    StrokeTooShort,
}

/// Caller-supplied identity fields, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Provenance {
    pub id: Option<f64>,
    pub created_at: Option<f64>,
}

/// A validated event that has not yet been stamped with defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Stroke {
        points: Vec<Point>,
        color: String,
        size: f64,
        provenance: Provenance,
    },
    Stencil {
        position: Point,
        color: String,
        provenance: Provenance,
    },
}

impl Candidate {
    /// Parse a request body of the form `{"stroke": {...}}`.
    ///
    /// A falsy `stroke` (`null`, `false`, `0`, `""`) counts as missing.
    pub fn from_payload(payload: &Value) -> Result<Self, IngestError> {
        match payload.get("stroke") {
            Some(raw) if !is_falsy(raw) => Self::parse(raw),
            _ => Err(IngestError::MissingStroke),
        }
    }

    /// Parse the event object itself.
    pub fn parse(raw: &Value) -> Result<Self, IngestError> {
        let provenance = Provenance {
            id: finite_number(raw.get("id")),
            created_at: finite_number(raw.get("createdAt")),
        };
        let color = resolve_color(raw.get("color"));

        if raw.get("type").and_then(Value::as_str) == Some("stencil") {
            let position = stencil_position(raw)
                .ok_or(IngestError::InvalidStencilPosition)
                .and_then(|p| {
                    normalize_position(p).map_err(|_| IngestError::InvalidStencilPosition)
                })?;
            return Ok(Candidate::Stencil {
                position,
                color,
                provenance,
            });
        }

        let raw_points = raw
            .get("points")
            .and_then(Value::as_array)
            .ok_or(IngestError::InvalidStrokeFormat)?;
        let points: Vec<Point> = raw_points.iter().filter_map(normalize_point).collect();
        if points.len() < 2 {
            return Err(IngestError::StrokeTooShort);
        }

        Ok(Candidate::Stroke {
            points,
            color,
            size: resolve_size(raw.get("size")),
            provenance,
        })
    }

    /// Fill in missing id and timestamp and produce the canonical event.
    pub fn into_event(self, clock: &dyn Clock) -> DrawEvent {
        match self {
            Candidate::Stroke {
                points,
                color,
                size,
                provenance,
            } => {
                let (id, created_at) = stamp(provenance, clock);
                DrawEvent::Stroke(Stroke {
                    id,
                    created_at,
                    points,
                    color,
                    size,
                })
            }
            Candidate::Stencil {
                position,
                color,
                provenance,
            } => {
                let (id, created_at) = stamp(provenance, clock);
                DrawEvent::Stencil(Stencil {
                    id,
                    created_at,
                    kind: StencilKind::Stencil,
                    position,
                    color,
                })
            }
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn finite_number(raw: Option<&Value>) -> Option<f64> {
    raw.and_then(Value::as_f64).filter(|v| v.is_finite())
}

/// `position` wins over the legacy `center` whenever it is present.
fn stencil_position(raw: &Value) -> Option<&Value> {
    match raw.get("position") {
        Some(Value::Null) | None => raw.get("center").filter(|v| !v.is_null()),
        Some(position) => Some(position),
    }
}

fn resolve_color(raw: Option<&Value>) -> String {
    raw.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_COLOR)
        .to_string()
}

fn resolve_size(raw: Option<&Value>) -> f64 {
    raw.and_then(Value::as_f64)
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_SIZE)
}

fn stamp(provenance: Provenance, clock: &dyn Clock) -> (f64, f64) {
    let id = provenance.id.unwrap_or_else(|| clock.next_id());
    let created_at = provenance.created_at.unwrap_or_else(|| clock.now_millis());
    (id, created_at)
}

/// Failure while ingesting a payload.
#[derive(Debug, Error)]
pub enum IngestFailure {
    #[error(transparent)]
    Rejected(#[from] IngestError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate a payload and append the resulting event to the store.
pub async fn ingest(
    store: &dyn StrokeStore,
    clock: &dyn Clock,
    payload: &Value,
) -> Result<DrawEvent, IngestFailure> {
    let event = Candidate::from_payload(payload)?.into_event(clock);
    store.append(event.clone()).await?;
    log::debug!("Stored event {} ({} store capacity)", event.id(), store.capacity());
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStrokeStore;
    use crate::testing::block_on;
    use serde_json::json;

    /// Clock with fixed readings.
    struct FixedClock;

    impl Clock for FixedClock {
        fn now_millis(&self) -> f64 {
            1_000.0
        }

        fn tiebreak(&self) -> f64 {
            0.25
        }
    }

    fn submit(stroke: Value) -> Result<DrawEvent, IngestError> {
        Candidate::from_payload(&json!({ "stroke": stroke })).map(|c| c.into_event(&FixedClock))
    }

    #[test]
    fn test_missing_stroke() {
        assert_eq!(Candidate::from_payload(&json!({})), Err(IngestError::MissingStroke));
        assert_eq!(
            Candidate::from_payload(&json!({ "stroke": null })),
            Err(IngestError::MissingStroke)
        );
        for falsy in [json!(false), json!(0), json!(0.0), json!("")] {
            assert_eq!(
                Candidate::from_payload(&json!({ "stroke": falsy })),
                Err(IngestError::MissingStroke)
            );
        }
        assert_eq!(
            Candidate::from_payload(&json!({ "stroke": true })),
            Err(IngestError::InvalidStrokeFormat)
        );
    }

    #[test]
    fn test_points_must_be_sequence() {
        assert_eq!(submit(json!({})), Err(IngestError::InvalidStrokeFormat));
        assert_eq!(submit(json!({ "points": "0,0" })), Err(IngestError::InvalidStrokeFormat));
        assert_eq!(submit(json!("scribble")), Err(IngestError::InvalidStrokeFormat));
    }

    #[test]
    fn test_one_valid_point_is_too_short() {
        let result = submit(json!({
            "points": [{ "x": 0.5, "y": 0.5 }, { "x": 2, "y": 0.5 }, { "x": 0.5, "y": -1 }]
        }));
        assert_eq!(result, Err(IngestError::StrokeTooShort));
        assert_eq!(submit(json!({ "points": [] })), Err(IngestError::StrokeTooShort));
    }

    #[test]
    fn test_invalid_points_filtered() {
        let event = submit(json!({
            "points": [
                { "x": 0.1, "y": 0.1 },
                { "x": 1.5, "y": 0.1 },
                "bogus",
                { "x": 0.9, "y": 0.9 },
            ]
        }))
        .unwrap();
        let DrawEvent::Stroke(stroke) = event else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.points, vec![Point::new(0.1, 0.1), Point::new(0.9, 0.9)]);
    }

    #[test]
    fn test_overflowing_numbers_filtered() {
        let payload: Value = serde_json::from_str(
            r#"{"stroke":{"id":1e400,"points":[{"x":1e400,"y":0.5},{"x":0.1,"y":0.1},{"x":0.9,"y":-1e400},{"x":0.9,"y":0.9}]}}"#,
        )
        .unwrap();
        let event = Candidate::from_payload(&payload).unwrap().into_event(&FixedClock);
        assert_eq!(event.id(), 1_000.25);
        let DrawEvent::Stroke(stroke) = event else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.points, vec![Point::new(0.1, 0.1), Point::new(0.9, 0.9)]);
    }

    #[test]
    fn test_defaults_applied() {
        let event = submit(json!({
            "points": [{ "x": 0, "y": 0 }, { "x": 1, "y": 1 }],
            "color": "   ",
            "size": -2,
        }))
        .unwrap();
        let DrawEvent::Stroke(stroke) = event else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.color, "#000000");
        assert_eq!(stroke.size, 3.0);
        assert_eq!(stroke.id, 1_000.25);
        assert_eq!(stroke.created_at, 1_000.0);
    }

    #[test]
    fn test_caller_fields_kept() {
        let event = submit(json!({
            "id": 42,
            "createdAt": 7.5,
            "points": [{ "x": 0, "y": 0 }, { "x": 1, "y": 1 }],
            "color": " #ff0000 ",
            "size": 8,
        }))
        .unwrap();
        let DrawEvent::Stroke(stroke) = event else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.id, 42.0);
        assert_eq!(stroke.created_at, 7.5);
        assert_eq!(stroke.color, "#ff0000");
        assert_eq!(stroke.size, 8.0);
    }

    #[test]
    fn test_non_numeric_id_is_synthesized() {
        let event = submit(json!({
            "id": "abc",
            "points": [{ "x": 0, "y": 0 }, { "x": 1, "y": 1 }],
            "size": "9",
        }))
        .unwrap();
        assert_eq!(event.id(), 1_000.25);
        let DrawEvent::Stroke(stroke) = event else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.size, 3.0);
    }

    #[test]
    fn test_stencil_position() {
        assert_eq!(
            submit(json!({ "type": "stencil", "position": { "x": 1.5, "y": 0.2 } })),
            Err(IngestError::InvalidStencilPosition)
        );
        assert_eq!(
            submit(json!({ "type": "stencil" })),
            Err(IngestError::InvalidStencilPosition)
        );

        let event = submit(json!({ "type": "stencil", "position": { "x": 0.5, "y": 0.5 } })).unwrap();
        assert!(event.is_stencil());
        assert_eq!(serde_json::to_value(&event).unwrap()["type"], "stencil");
    }

    #[test]
    fn test_stencil_legacy_center() {
        let event = submit(json!({ "type": "stencil", "center": { "x": 0.2, "y": 0.3 } })).unwrap();
        let DrawEvent::Stencil(stencil) = event else {
            panic!("expected stencil");
        };
        assert_eq!(stencil.position, Point::new(0.2, 0.3));
    }

    #[test]
    fn test_position_takes_precedence_over_center() {
        let event = submit(json!({
            "type": "stencil",
            "position": { "x": 0.1, "y": 0.1 },
            "center": { "x": 0.9, "y": 0.9 },
        }))
        .unwrap();
        let DrawEvent::Stencil(stencil) = event else {
            panic!("expected stencil");
        };
        assert_eq!(stencil.position, Point::new(0.1, 0.1));

        // An invalid position is not rescued by a valid center.
        assert_eq!(
            submit(json!({
                "type": "stencil",
                "position": { "x": 5, "y": 0.1 },
                "center": { "x": 0.9, "y": 0.9 },
            })),
            Err(IngestError::InvalidStencilPosition)
        );
    }

    #[test]
    fn test_ingest_appends() {
        let store = MemoryStrokeStore::new();
        let payload = json!({ "stroke": { "points": [{ "x": 0, "y": 0 }, { "x": 1, "y": 1 }] } });
        block_on(ingest(&store, &FixedClock, &payload)).unwrap();

        let rejected = block_on(ingest(&store, &FixedClock, &json!({ "stroke": {} })));
        assert!(matches!(
            rejected,
            Err(IngestFailure::Rejected(IngestError::InvalidStrokeFormat))
        ));
        assert_eq!(block_on(store.len()).unwrap(), 1);
    }
}
