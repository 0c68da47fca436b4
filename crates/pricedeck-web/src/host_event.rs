#![forbid(unsafe_code)]

//! JSON bridge between JS hosts and the pointer-capture adapter.
//!
//! Hosts forward DOM pointer events as small JSON objects:
//!
//! ```json
//! {"kind":"pointerdown","pointerId":1,"button":0,"x":52.5,"y":40}
//! {"kind":"pointermove","pointerId":1,"x":170,"y":38}
//! {"kind":"pointerup","pointerId":1,"button":0,"x":170,"y":38}
//! {"kind":"blur"}
//! ```
//!
//! and receive registry snapshots back as JSON for rendering. Unknown kinds
//! decode to `Ok(None)` so newer hosts can send events this side ignores.

use pricedeck_core::{Point, Registry, Tier};
use serde::{Deserialize, Serialize};

use crate::pointer_capture::{PointerButton, PointerCaptureAdapter, PointerDispatch, PointerLogEntry};

/// Errors from decoding host JSON or encoding snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEventError {
    /// Malformed JSON, or JSON that does not describe a valid value.
    Json(String),
    /// Missing required field for the event kind.
    MissingField(&'static str),
    /// Serialization failure.
    Encode(String),
}

impl core::fmt::Display for HostEventError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::Encode(msg) => write!(f, "JSON encode error: {msg}"),
        }
    }
}

impl std::error::Error for HostEventError {}

/// A decoded host pointer/lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    PointerDown {
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    },
    PointerMove {
        pointer_id: u32,
        position: Point,
    },
    PointerUp {
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    },
    PointerCancel {
        pointer_id: Option<u32>,
    },
    PointerLeave {
        pointer_id: u32,
    },
    GotPointerCapture {
        pointer_id: u32,
    },
    LostPointerCapture {
        pointer_id: u32,
    },
    Blur,
    VisibilityHidden,
}

impl HostEvent {
    /// Feed this event to `adapter`.
    pub fn dispatch(self, adapter: &mut PointerCaptureAdapter) -> PointerDispatch {
        match self {
            Self::PointerDown {
                pointer_id,
                button,
                position,
            } => adapter.pointer_down(pointer_id, button, position),
            Self::PointerMove {
                pointer_id,
                position,
            } => adapter.pointer_move(pointer_id, position),
            Self::PointerUp {
                pointer_id,
                button,
                position,
            } => adapter.pointer_up(pointer_id, button, position),
            Self::PointerCancel { pointer_id } => adapter.pointer_cancel(pointer_id),
            Self::PointerLeave { pointer_id } => adapter.pointer_leave(pointer_id),
            Self::GotPointerCapture { pointer_id } => adapter.capture_acquired(pointer_id),
            Self::LostPointerCapture { pointer_id } => adapter.lost_pointer_capture(pointer_id),
            Self::Blur => adapter.blur(),
            Self::VisibilityHidden => adapter.visibility_hidden(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHostEvent {
    kind: String,
    #[serde(default)]
    pointer_id: Option<u32>,
    #[serde(default)]
    button: Option<i32>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    hidden: Option<bool>,
}

/// Decode one host event. `Ok(None)` for kinds with no adapter mapping.
pub fn parse_host_event(json: &str) -> Result<Option<HostEvent>, HostEventError> {
    let raw: RawHostEvent =
        serde_json::from_str(json).map_err(|e| HostEventError::Json(e.to_string()))?;

    let event = match raw.kind.as_str() {
        "pointerdown" => HostEvent::PointerDown {
            pointer_id: require_pointer_id(&raw)?,
            button: PointerButton::from_dom(raw.button.unwrap_or(0)),
            position: require_position(&raw)?,
        },
        "pointermove" => HostEvent::PointerMove {
            pointer_id: require_pointer_id(&raw)?,
            position: require_position(&raw)?,
        },
        "pointerup" => HostEvent::PointerUp {
            pointer_id: require_pointer_id(&raw)?,
            button: PointerButton::from_dom(raw.button.unwrap_or(0)),
            position: require_position(&raw)?,
        },
        "pointercancel" => HostEvent::PointerCancel {
            pointer_id: raw.pointer_id,
        },
        "pointerleave" => HostEvent::PointerLeave {
            pointer_id: require_pointer_id(&raw)?,
        },
        "gotpointercapture" => HostEvent::GotPointerCapture {
            pointer_id: require_pointer_id(&raw)?,
        },
        "lostpointercapture" => HostEvent::LostPointerCapture {
            pointer_id: require_pointer_id(&raw)?,
        },
        "blur" => HostEvent::Blur,
        // Only the transition to hidden interrupts a gesture.
        "visibilitychange" => match raw.hidden {
            Some(true) => HostEvent::VisibilityHidden,
            Some(false) => return Ok(None),
            None => return Err(HostEventError::MissingField("hidden")),
        },
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn require_pointer_id(raw: &RawHostEvent) -> Result<u32, HostEventError> {
    raw.pointer_id
        .ok_or(HostEventError::MissingField("pointerId"))
}

fn require_position(raw: &RawHostEvent) -> Result<Point, HostEventError> {
    let x = raw.x.ok_or(HostEventError::MissingField("x"))?;
    let y = raw.y.ok_or(HostEventError::MissingField("y"))?;
    Ok(Point::new(to_pixel(x), to_pixel(y)))
}

/// Round a CSS pixel coordinate; out-of-range and NaN values saturate.
fn to_pixel(value: f64) -> i32 {
    value.round() as i32
}

/// Decode and dispatch in one step.
pub fn dispatch_host_json(
    adapter: &mut PointerCaptureAdapter,
    json: &str,
) -> Result<Option<PointerDispatch>, HostEventError> {
    Ok(parse_host_event(json)?.map(|event| event.dispatch(adapter)))
}

/// Registry snapshot as sent to JS renderers.
#[derive(Debug, Serialize)]
pub struct RegistrySnapshot<'a> {
    pub revision: u64,
    pub tiers: &'a [Tier],
}

/// Encode the adapter's current registry.
pub fn encode_snapshot(adapter: &PointerCaptureAdapter) -> Result<String, HostEventError> {
    let engine = adapter.engine();
    encode_registry(engine.registry(), engine.revision())
}

/// Encode `registry` at `revision`.
pub fn encode_registry(registry: &Registry, revision: u64) -> Result<String, HostEventError> {
    serde_json::to_string(&RegistrySnapshot {
        revision,
        tiers: registry.tiers(),
    })
    .map_err(|e| HostEventError::Encode(e.to_string()))
}

/// Decode a host-supplied ladder. Duplicate ids are rejected.
pub fn parse_registry(json: &str) -> Result<Registry, HostEventError> {
    serde_json::from_str(json).map_err(|e| HostEventError::Json(e.to_string()))
}

/// Encode a dispatch log entry for host-side diagnostics.
pub fn encode_log_entry(entry: &PointerLogEntry) -> Result<String, HostEventError> {
    serde_json::to_string(entry).map_err(|e| HostEventError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_pointer_down() {
        let event =
            parse_host_event(r#"{"kind":"pointerdown","pointerId":3,"button":0,"x":52.6,"y":40.2}"#)
                .unwrap();
        assert_eq!(
            event,
            Some(HostEvent::PointerDown {
                pointer_id: 3,
                button: PointerButton::Primary,
                position: Point::new(53, 40),
            })
        );
    }

    #[test]
    fn button_defaults_to_primary() {
        let event = parse_host_event(r#"{"kind":"pointerup","pointerId":3,"x":1,"y":2}"#).unwrap();
        assert!(matches!(
            event,
            Some(HostEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            })
        ));
    }

    #[test]
    fn missing_fields_are_reported() {
        assert_eq!(
            parse_host_event(r#"{"kind":"pointermove","x":1,"y":2}"#),
            Err(HostEventError::MissingField("pointerId"))
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"pointermove","pointerId":1,"x":1}"#),
            Err(HostEventError::MissingField("y"))
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"visibilitychange"}"#),
            Err(HostEventError::MissingField("hidden"))
        );
    }

    #[test]
    fn lifecycle_kinds() {
        assert_eq!(
            parse_host_event(r#"{"kind":"pointercancel"}"#).unwrap(),
            Some(HostEvent::PointerCancel { pointer_id: None })
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"blur"}"#).unwrap(),
            Some(HostEvent::Blur)
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"visibilitychange","hidden":true}"#).unwrap(),
            Some(HostEvent::VisibilityHidden)
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"visibilitychange","hidden":false}"#).unwrap(),
            None
        );
        assert_eq!(
            parse_host_event(r#"{"kind":"lostpointercapture","pointerId":8}"#).unwrap(),
            Some(HostEvent::LostPointerCapture { pointer_id: 8 })
        );
    }

    #[test]
    fn unknown_kind_is_none_and_bad_json_errors() {
        assert_eq!(parse_host_event(r#"{"kind":"wheel","dy":3}"#).unwrap(), None);
        assert!(matches!(
            parse_host_event("{not json"),
            Err(HostEventError::Json(_))
        ));
        assert!(matches!(
            parse_host_event(r#"{"pointerId":1}"#),
            Err(HostEventError::Json(_))
        ));
    }

    #[test]
    fn huge_coordinates_saturate() {
        let event =
            parse_host_event(r#"{"kind":"pointermove","pointerId":1,"x":1e12,"y":-1e12}"#).unwrap();
        assert_eq!(
            event,
            Some(HostEvent::PointerMove {
                pointer_id: 1,
                position: Point::new(i32::MAX, i32::MIN),
            })
        );
    }

    #[test]
    fn registry_json_rejects_duplicates() {
        let json = r#"[{"id":"tierA","label":"A","left_metric":0.0,"right_metric":0.0,
            "items":[{"id":"p1","payload":{"brand":"b","description":"","price_cents":1,
            "size":null,"unit_price_cents":null,"category":"c","color":""}},
            {"id":"p1","payload":{"brand":"b","description":"","price_cents":1,
            "size":null,"unit_price_cents":null,"category":"c","color":""}}]}]"#;
        assert!(matches!(parse_registry(json), Err(HostEventError::Json(_))));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            HostEventError::MissingField("x").to_string(),
            "missing required field: x"
        );
    }
}
