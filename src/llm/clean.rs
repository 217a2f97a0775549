// src/llm/clean.rs
//! Cleanup of raw model text before it is shown or parsed.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*").expect("fence open regex"));
static RE_FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```$").expect("fence close regex"));
// Closed blocks anywhere, plus an unterminated block running to end of text.
static RE_THINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<think>.*?</think>|<think>.*\z").expect("think block regex")
});

/// Remove reasoning blocks and a surrounding markdown code fence, then trim.
pub fn clean_output(raw: &str) -> String {
    debug!(target: "llm", raw = %raw, "raw LLM output");

    let without_think = strip_think_blocks(raw);
    let cleaned = strip_code_fence(&without_think);

    debug!(target: "llm", cleaned = %cleaned, "cleaned LLM output");
    cleaned
}

/// Strip one leading ```` ``` ```` / ```` ```json ```` and one trailing ```` ``` ````.
pub fn strip_code_fence(text: &str) -> String {
    let opened = RE_FENCE_OPEN.replace(text.trim(), "");
    let closed = RE_FENCE_CLOSE.replace(&opened, "");
    closed.trim().to_string()
}

pub fn strip_think_blocks(text: &str) -> String {
    RE_THINK.replace_all(text, "").trim().to_string()
}
