// src/evaluator.rs
//! Match a user's answers to the best-fitting party.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;
use crate::llm::{self, parse, LlmProvider};
use crate::prompts;

/// Question id → selected Likert label.
pub type UserAnswerSet = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub best_party: String,
}

pub async fn evaluate_answers(
    provider: &dyn LlmProvider,
    summary: &str,
    available_parties: &[String],
    answers: &UserAnswerSet,
    max_tokens: u32,
) -> Result<MatchResult, LlmError> {
    let prompt = prompts::match_prompt(summary, available_parties, answers);
    let output = llm::complete(provider, "match", &prompt, max_tokens).await?;
    interpret_match(&output)
}

/// Validate cleaned model output and extract `best_party`.
pub fn interpret_match(output: &str) -> Result<MatchResult, LlmError> {
    if output.trim().is_empty() || parse::is_undefined_sentinel(output) {
        return Err(LlmError::Undefined);
    }
    let value = parse::parse_json_lenient(output)?;
    let best = value
        .get("best_party")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !parse::is_undefined_sentinel(s));

    match best {
        Some(name) => Ok(MatchResult {
            best_party: name.to_string(),
        }),
        None => Err(LlmError::Schema {
            detail: "expected {\"best_party\": <name>}".to_string(),
            output: output.to_string(),
        }),
    }
}
