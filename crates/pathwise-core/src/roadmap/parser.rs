//! Raw model output to untyped JSON.
//!
//! Strips an optional surrounding code fence (```` ```json ... ``` ````) and
//! whitespace, then deserializes. There is no partial recovery: the cleaned
//! text is either one well-formed JSON document or a [`ParseError`].

use serde_json::Value;
use thiserror::Error;

/// The model output was not well-formed JSON after cleaning.
///
/// `raw` keeps the original text for diagnostics. It is left
/// out of the `Display` output so it never reaches a user-facing message.
#[derive(Debug, Error)]
#[error("model response is not valid JSON: {source}")]
pub struct ParseError {
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Remove a leading fence line (with optional language tag) and a trailing
/// fence, plus surrounding whitespace.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the rest of the opening line: a language tag such as `json`.
        text = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    let trimmed = text.trim_end();
    if let Some(rest) = trimmed.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Clean and deserialize a raw model response.
pub fn parse_response(raw: &str) -> Result<Value, ParseError> {
    let cleaned = strip_code_fence(raw);
    serde_json::from_str(cleaned).map_err(|source| ParseError {
        raw: raw.to_owned(),
        source,
    })
}
