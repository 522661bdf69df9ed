//! Turns raw model output into something displayable.
//!
//! Parsing failures are not errors here: text that does not parse comes back
//! as a [`LectureResponse::Fallback`] carrying the cleaned text, so callers
//! always have something to show.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::LectureDocument;

/// Warning attached to every fallback payload.
pub const INVALID_JSON_WARNING: &str = "Response not valid JSON";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LectureResponse {
    Fallback { raw_output: String, warning: String },
    Document(Value),
}

impl LectureResponse {
    pub fn is_fallback(&self) -> bool {
        matches!(self, LectureResponse::Fallback { .. })
    }

    /// Typed view of a parsed document. `None` for fallbacks and for JSON
    /// that is not an object. Mistyped fields inside an object are dropped
    /// one by one, never the whole document.
    pub fn document(&self) -> Option<LectureDocument> {
        match self {
            LectureResponse::Document(value @ Value::Object(_)) => serde_json::from_value(value.clone()).ok(),
            LectureResponse::Document(_) => None,
            LectureResponse::Fallback { .. } => None,
        }
    }

    /// Echoed `output_mode`, when the document carries one.
    pub fn output_mode(&self) -> Option<&str> {
        match self {
            LectureResponse::Document(value) => value.get("output_mode").and_then(Value::as_str),
            LectureResponse::Fallback { .. } => None,
        }
    }
}

fn strip_json_fence(text: &str) -> &str {
    const MARKER: &str = "```json";
    match text.get(..MARKER.len()) {
        Some(head) if head.eq_ignore_ascii_case(MARKER) => text[MARKER.len()..].trim_start(),
        _ => text,
    }
}

/// Drop one leading ```` ```json ```` (any case) or ```` ``` ```` marker and
/// one trailing ```` ``` ````, then trim. Only the very start and end of the
/// text are looked at.
pub fn strip_code_fences(text: &str) -> &str {
    let text = strip_json_fence(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Clean `raw` and parse it, falling back to the cleaned text on failure.
pub fn normalize_response(raw: &str) -> LectureResponse {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => LectureResponse::Document(value),
        Err(e) => {
            log::warn!("Model output is not valid JSON ({}), returning raw text", e);
            LectureResponse::Fallback {
                raw_output: cleaned.to_string(),
                warning: INVALID_JSON_WARNING.to_string(),
            }
        }
    }
}
