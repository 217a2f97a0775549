// src/llm/mock.rs
//! Deterministic provider for tests and offline runs.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use serde_json::json;

use super::LlmProvider;
use crate::error::LlmError;
use crate::prompts;
use crate::questions::LIKERT_OPTIONS;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw `response` text, as the model would produce it.
    Text(String),
    /// Simulated connection failure.
    Transport(String),
    /// Simulated non-JSON envelope from the LLM service.
    BadEnvelope(String),
}

impl MockReply {
    fn into_result(self) -> Result<String, LlmError> {
        match self {
            MockReply::Text(t) => Ok(t),
            MockReply::Transport(e) => Err(LlmError::Transport(e)),
            MockReply::BadEnvelope(body) => {
                let detail = serde_json::from_str::<serde_json::Value>(&body)
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "missing `response` field".to_string());
                Err(LlmError::UpstreamDecode { detail, body })
            }
        }
    }
}

enum Script {
    /// Replies in order; the last one repeats once the queue is drained.
    Sequence(VecDeque<MockReply>),
    /// Plausible answers keyed on which prompt is being asked.
    Canned { parties: Vec<String> },
}

pub struct MockProvider {
    script: Mutex<Script>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::sequence(vec![MockReply::Text(text.into())])
    }

    pub fn sequence(replies: Vec<MockReply>) -> Self {
        Self::with_script(Script::Sequence(replies.into()))
    }

    pub fn canned(parties: Vec<String>) -> Self {
        Self::with_script(Script::Canned { parties })
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_reply(&self, prompt: &str) -> MockReply {
        let mut script = match self.script.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &mut *script {
            Script::Sequence(queue) => {
                if queue.len() > 1 {
                    queue.pop_front().unwrap_or_else(empty_reply)
                } else {
                    queue.front().cloned().unwrap_or_else(empty_reply)
                }
            }
            Script::Canned { parties } => MockReply::Text(canned_reply(prompt, parties)),
        }
    }
}

fn empty_reply() -> MockReply {
    MockReply::Text(String::new())
}

fn canned_reply(prompt: &str, parties: &[String]) -> String {
    if prompt.starts_with(prompts::SUMMARY_LEAD) {
        return parties
            .iter()
            .map(|p| format!("{p}\n- point one\n- point two\n- point three"))
            .collect::<Vec<_>>()
            .join("\n");
    }
    if prompt.starts_with(prompts::QUESTIONS_LEAD) {
        let items: Vec<_> = (1..=10)
            .map(|id| {
                json!({
                    "id": id,
                    "text": format!("Policy statement number {id}. Do you agree?"),
                    "options": LIKERT_OPTIONS,
                })
            })
            .collect();
        return format!("```json\n{}\n```", serde_json::Value::from(items));
    }
    if prompt.starts_with(prompts::MATCH_LEAD) {
        let best = parties.first().cloned().unwrap_or_default();
        return json!({ "best_party": best }).to_string();
    }
    String::new()
}

impl LlmProvider for MockProvider {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        _max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        if let Ok(mut seen) = self.prompts.lock() {
            seen.push(prompt.to_string());
        }
        let reply = self.next_reply(prompt);
        Box::pin(async move { reply.into_result() })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
