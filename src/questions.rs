// src/questions.rs
//! Likert survey generation and validation of the model's question list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::LlmError;
use crate::llm::{self, parse::parse_json_lenient, LlmProvider};
use crate::prompts;

/// Fixed answer scale, in display order.
pub const LIKERT_OPTIONS: [&str; 5] = [
    "Strongly Disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly Agree",
];

pub const EXPECTED_QUESTION_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
}

pub async fn generate_questions(
    provider: &dyn LlmProvider,
    summary: &str,
    max_tokens: u32,
) -> Result<Vec<SurveyQuestion>, LlmError> {
    let prompt = prompts::questions_prompt(summary);
    let output = llm::complete(provider, "questions", &prompt, max_tokens).await?;
    if output.is_empty() {
        return Err(LlmError::Empty);
    }
    let value = parse_json_lenient(&output)?;
    validate_questions(value, &output)
}

/// Coerce the parsed model output into well-formed questions.
///
/// Accepts a bare array or `{"questions": [...]}`. Entries without text are
/// dropped, ids that are missing, non-numeric or repeated are reassigned, and
/// options are always the fixed Likert scale.
pub fn validate_questions(value: Value, raw: &str) -> Result<Vec<SurveyQuestion>, LlmError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => return Err(schema_error("expected a JSON array of questions", raw)),
        },
        _ => return Err(schema_error("expected a JSON array of questions", raw)),
    };

    let mut used = HashSet::new();
    let mut pending: Vec<(Option<u32>, String)> = Vec::with_capacity(items.len());
    for item in &items {
        let Some(text) = item.get("text").and_then(Value::as_str).map(str::trim) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        let id = item.get("id").and_then(id_from_value).filter(|id| used.insert(*id));
        if !options_match_scale(item.get("options")) {
            warn!(target: "llm", text, "question options differ from the Likert scale; replaced");
        }
        pending.push((id, text.to_string()));
    }

    if pending.is_empty() {
        return Err(schema_error("no question with a text field", raw));
    }

    let mut next_free = 1u32;
    let questions: Vec<SurveyQuestion> = pending
        .into_iter()
        .map(|(id, text)| {
            let id = id.unwrap_or_else(|| {
                while used.contains(&next_free) {
                    next_free += 1;
                }
                used.insert(next_free);
                next_free
            });
            SurveyQuestion {
                id,
                text,
                options: LIKERT_OPTIONS.iter().map(|s| s.to_string()).collect(),
            }
        })
        .collect();

    if questions.len() != EXPECTED_QUESTION_COUNT {
        warn!(
            target: "llm",
            got = questions.len(),
            expected = EXPECTED_QUESTION_COUNT,
            "unexpected number of questions"
        );
    }
    Ok(questions)
}

fn id_from_value(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn options_match_scale(options: Option<&Value>) -> bool {
    let Some(Value::Array(opts)) = options else {
        return false;
    };
    opts.len() == LIKERT_OPTIONS.len()
        && opts
            .iter()
            .zip(LIKERT_OPTIONS)
            .all(|(o, expected)| o.as_str().map(str::trim) == Some(expected))
}

fn schema_error(detail: &str, raw: &str) -> LlmError {
    LlmError::Schema {
        detail: detail.to_string(),
        output: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockProvider, MockReply};
    use serde_json::json;

    #[tokio::test]
    async fn fenced_array_is_parsed() {
        let mock = MockProvider::fixed(
            "```json\n[{\"id\":1,\"text\":\"Raise the minimum wage.\",\"options\":[\"Strongly Disagree\",\"Disagree\",\"Neutral\",\"Agree\",\"Strongly Agree\"]}]\n```",
        );
        let qs = generate_questions(&mock, "summary", 500).await.unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].id, 1);
        assert_eq!(qs[0].text, "Raise the minimum wage.");
        assert_eq!(qs[0].options, LIKERT_OPTIONS.to_vec());
        assert!(mock.prompts()[0].ends_with("Programme summary: summary"));
    }

    #[tokio::test]
    async fn empty_output_is_reported() {
        let mock = MockProvider::fixed("```json\n```");
        let err = generate_questions(&mock, "s", 500).await.unwrap_err();
        assert!(matches!(err, LlmError::Empty), "{err:?}");
    }

    #[tokio::test]
    async fn unparsable_output_keeps_raw_text() {
        let mock = MockProvider::fixed("Sorry, I can't do that.");
        let err = generate_questions(&mock, "s", 500).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse JSON output:"), "{msg}");
        assert!(msg.ends_with("| Output was: Sorry, I can't do that."), "{msg}");
    }

    #[tokio::test]
    async fn transport_error_passes_through() {
        let mock = MockProvider::sequence(vec![MockReply::Transport("timed out".into())]);
        let err = generate_questions(&mock, "s", 500).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }

    #[test]
    fn wrapped_object_and_messy_ids_are_normalized() {
        let value = json!({"questions": [
            {"id": "2", "text": " Tax wealth at 60%. "},
            {"id": 2, "text": "Expand rail.", "options": ["Yes", "No"]},
            {"text": "Cut subsidies."},
            {"id": 7, "text": ""},
            {"id": 9}
        ]});
        let qs = validate_questions(value, "raw").unwrap();
        let ids: Vec<u32> = qs.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(qs[0].text, "Tax wealth at 60%.");
        assert!(qs.iter().all(|q| q.options.len() == 5));
    }

    #[test]
    fn non_array_is_a_schema_error() {
        let err = validate_questions(json!({"best_party": "SPD"}), "raw").unwrap_err();
        assert!(matches!(err, LlmError::Schema { .. }));
        let err = validate_questions(json!([{"id": 1}]), "raw").unwrap_err();
        assert!(err.to_string().contains("Output was: raw"));
    }
}
