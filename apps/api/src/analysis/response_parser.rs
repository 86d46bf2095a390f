//! Response Parser: best-effort recovery of a JSON object from free-form
//! model output.
//!
//! Completions often wrap the JSON in prose or code fences. The parser takes
//! everything from the first `{` through the LAST `}` and parses that span.
//! Nothing escapes this module as an error: "no JSON" is an ordinary outcome.

use serde_json::{Map, Value};
use tracing::debug;

/// Outcome of scanning a completion for a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Object(Map<String, Value>),
    /// No `{ ... }` span in the text.
    NotFound,
    /// A brace span exists but is not a valid JSON object.
    Invalid(String),
}

impl ParsedResponse {
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            ParsedResponse::Object(object) => Some(object),
            ParsedResponse::NotFound | ParsedResponse::Invalid(_) => None,
        }
    }
}

/// Extracts the object spanning the first `{` to the last `}` in `response`.
pub fn parse(response: &str) -> ParsedResponse {
    let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) else {
        return ParsedResponse::NotFound;
    };
    if end < start {
        return ParsedResponse::NotFound;
    }

    let candidate = &response[start..=end];
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => ParsedResponse::Object(object),
        Ok(other) => ParsedResponse::Invalid(format!("expected a JSON object, got {other}")),
        Err(e) => {
            debug!("Discarding unparseable completion span: {candidate}");
            ParsedResponse::Invalid(e.to_string())
        }
    }
}
