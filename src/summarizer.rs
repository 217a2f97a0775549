// src/summarizer.rs
//! One-shot programme summary, produced at startup and cached in `AppState`.

use tracing::{info, warn};

use crate::error::LlmError;
use crate::llm::{self, LlmProvider};
use crate::programmes::PartyProgramme;
use crate::prompts;

/// Ask the model for 3 bullet points per party; returns the cleaned text.
pub async fn summarize_programmes(
    provider: &dyn LlmProvider,
    programmes: &[PartyProgramme],
    max_tokens: u32,
) -> Result<String, LlmError> {
    let prompt = prompts::summary_prompt(programmes);
    llm::complete(provider, "summary", &prompt, max_tokens).await
}

/// Startup variant: a failed call is not fatal, its message stands in for the
/// summary so the rest of the API stays up.
pub async fn summary_or_error_text(
    provider: &dyn LlmProvider,
    programmes: &[PartyProgramme],
    max_tokens: u32,
) -> String {
    match summarize_programmes(provider, programmes, max_tokens).await {
        Ok(text) => {
            info!(len = text.len(), parties = programmes.len(), "programme summary generated");
            text
        }
        Err(e) => {
            warn!(error = %e, "programme summary unavailable");
            e.to_string()
        }
    }
}
