// src/llm/parse.rs
//! Tolerant JSON extraction from cleaned model output.

use serde_json::Value;

use crate::error::LlmError;

/// Parse `output` as JSON. When the model wrapped the payload in prose, retry
/// on the outermost `{…}` or `[…]` span; the original parse error is reported
/// if that fails too.
pub fn parse_json_lenient(output: &str) -> Result<Value, LlmError> {
    match serde_json::from_str::<Value>(output) {
        Ok(v) => Ok(v),
        Err(first) => {
            if let Some(fragment) = outermost_json_span(output) {
                if let Ok(v) = serde_json::from_str::<Value>(fragment) {
                    tracing::debug!(target: "llm", "recovered JSON from surrounding prose");
                    return Ok(v);
                }
            }
            Err(LlmError::InvalidOutput {
                detail: first.to_string(),
                output: output.to_string(),
            })
        }
    }
}

fn outermost_json_span(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let close = if s[start..].starts_with('{') { '}' } else { ']' };
    let end = s.rfind(close)?;
    (end > start).then(|| &s[start..=end])
}

/// True for the literal sentinel `undefined` (any case, surrounding space).
pub fn is_undefined_sentinel(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("undefined")
}
