//! Best-effort JSON reply parsing
//!
//! Model replies are supposed to be JSON but often arrive wrapped in prose
//! or code fences. Try the whole text first, then the span from the first
//! `{` to the last `}`. Never fails: unusable text comes back as
//! `JsonReply::Invalid` carrying the raw input.

use serde::Serialize;
use serde_json::Value;

use crate::observability::Event;

/// Marker placed in the `error` field of an invalid reply.
pub const INVALID_JSON_RESPONSE: &str = "Invalid JSON response";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonReply {
    Parsed(Value),
    Invalid { error: &'static str, raw: String },
}

impl JsonReply {
    pub fn is_parsed(&self) -> bool {
        matches!(self, JsonReply::Parsed(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            JsonReply::Parsed(value) => Some(value),
            JsonReply::Invalid { .. } => None,
        }
    }
}

pub fn parse_json_response(text: &str) -> JsonReply {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return JsonReply::Parsed(value);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return JsonReply::Parsed(value);
            }
        }
    }

    tracing::warn!(
        event = %Event::ReplyParseFailed,
        length = text.len(),
        "reply is not JSON"
    );
    JsonReply::Invalid {
        error: INVALID_JSON_RESPONSE,
        raw: text.to_string(),
    }
}
