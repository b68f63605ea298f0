#![forbid(unsafe_code)]

//! JSON input parser for converting host-encoded inputs to [`PageEvent`]s.
//!
//! A record is one JSON object with a `kind` and, for element-bound kinds, a
//! `target` selector resolved against the current document (first match in
//! document order):
//!
//! | kind | fields |
//! |------|--------|
//! | `click` | `target`, optional `x`, `y` (client coordinates) |
//! | `key` | `key` (DOM `KeyboardEvent.key`) |
//! | `resize` | `width`, `height` |
//! | `scroll` | `y` |
//! | `blur`, `submit`, `pointerenter`, `pointerleave`, `mediaerror` | `target` |
//! | `input` | `target`, `value` |
//! | `toggle` | `target`, `checked` |
//!
//! Unknown kinds return `Ok(None)` so newer hosts can send records older
//! pages ignore.

use fpage_core::{Document, Key, NodeId, PageEvent, SelectorList};
use serde::{Deserialize, Serialize};

/// Errors from parsing encoded input JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// The `target` selector does not parse.
    BadSelector(String),
    /// No element matches the `target` selector.
    TargetNotFound(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::BadSelector(msg) => write!(f, "bad target selector: {msg}"),
            Self::TargetNotFound(sel) => write!(f, "no element matches {sel:?}"),
        }
    }
}

impl std::error::Error for InputParseError {}

/// Wire shape of one input record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl RawInput {
    /// Record of `kind` aimed at `target`.
    #[must_use]
    pub fn targeted(kind: &str, target: &str) -> Self {
        Self {
            kind: kind.to_string(),
            target: Some(target.to_string()),
            ..Self::default()
        }
    }

    /// Encode as a single JSON line.
    pub fn to_json(&self) -> Result<String, InputParseError> {
        serde_json::to_string(self).map_err(|e| InputParseError::Json(e.to_string()))
    }
}

/// Parse a JSON-encoded input record into a [`PageEvent`].
///
/// Returns `Ok(None)` for kinds without an event mapping. Returns `Err` for
/// malformed JSON, missing fields and targets that do not resolve.
pub fn parse_input(doc: &Document, json: &str) -> Result<Option<PageEvent>, InputParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;
    parse_raw(doc, &raw)
}

/// [`parse_input`] for an already-decoded record.
pub fn parse_raw(doc: &Document, raw: &RawInput) -> Result<Option<PageEvent>, InputParseError> {
    let event = match raw.kind.as_str() {
        "click" => PageEvent::Click {
            target: resolve_target(doc, raw)?,
            client_x: raw.x.unwrap_or(0.0),
            client_y: raw.y.unwrap_or(0.0),
        },
        "key" => {
            let key = raw
                .key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or(InputParseError::MissingField("key"))?;
            PageEvent::KeyDown(Key::from_dom(key))
        }
        "resize" => PageEvent::Resize {
            width: non_negative(raw.width.ok_or(InputParseError::MissingField("width"))?),
            height: non_negative(raw.height.ok_or(InputParseError::MissingField("height"))?),
        },
        "scroll" => PageEvent::Scroll {
            y: non_negative(raw.y.ok_or(InputParseError::MissingField("y"))?),
        },
        "blur" => PageEvent::Blur(resolve_target(doc, raw)?),
        "submit" => PageEvent::Submit(resolve_target(doc, raw)?),
        "pointerenter" => PageEvent::PointerEnter(resolve_target(doc, raw)?),
        "pointerleave" => PageEvent::PointerLeave(resolve_target(doc, raw)?),
        "mediaerror" => PageEvent::MediaError(resolve_target(doc, raw)?),
        "input" => {
            let target = resolve_target(doc, raw)?;
            let value = raw.value.clone().ok_or(InputParseError::MissingField("value"))?;
            PageEvent::Input { target, value }
        }
        "toggle" => {
            let target = resolve_target(doc, raw)?;
            let checked = raw.checked.ok_or(InputParseError::MissingField("checked"))?;
            PageEvent::Toggle { target, checked }
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn resolve_target(doc: &Document, raw: &RawInput) -> Result<NodeId, InputParseError> {
    let src = raw
        .target
        .as_deref()
        .ok_or(InputParseError::MissingField("target"))?;
    let selector =
        SelectorList::parse(src).map_err(|e| InputParseError::BadSelector(e.to_string()))?;
    doc.query(doc.root(), &selector)
        .ok_or_else(|| InputParseError::TargetNotFound(src.to_string()))
}

#[inline]
fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
