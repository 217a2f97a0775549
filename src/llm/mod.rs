// src/llm/mod.rs
//! LLM adapter: provider abstraction, Ollama + mock providers, and the
//! instrumented `complete` call every operation goes through.

pub mod clean;
pub mod mock;
pub mod ollama;
pub mod parse;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::error::LlmError;

pub use clean::clean_output;
pub use mock::{MockProvider, MockReply};
pub use ollama::OllamaProvider;

/// Text-generation backend. Returns the raw `response` text of one
/// non-streaming completion.
pub trait LlmProvider: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynLlm = Arc<dyn LlmProvider>;

/// Factory: `LLM_TEST_MODE=mock` yields the canned mock, otherwise Ollama.
pub fn build_provider(cfg: &LlmConfig, party_names: &[String]) -> anyhow::Result<DynLlm> {
    if std::env::var("LLM_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        warn!("LLM_TEST_MODE=mock: using canned LLM replies");
        return Ok(Arc::new(MockProvider::canned(party_names.to_vec())));
    }
    Ok(Arc::new(OllamaProvider::new(cfg)?))
}

/// One instrumented round trip: generate, record metrics, clean the text.
pub async fn complete(
    provider: &dyn LlmProvider,
    op: &'static str,
    prompt: &str,
    max_tokens: u32,
) -> Result<String, LlmError> {
    counter!("llm_requests_total", "op" => op).increment(1);
    let started = Instant::now();

    let result = provider.generate(prompt, max_tokens).await;
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    histogram!("llm_duration_ms", "op" => op).record(ms);

    match result {
        Ok(raw) => {
            let cleaned = clean_output(&raw);
            info!(
                target: "llm",
                op,
                provider = provider.name(),
                ms = ms as u64,
                id = %anon_hash(&cleaned),
                len = cleaned.len(),
                "LLM call finished"
            );
            Ok(cleaned)
        }
        Err(e) => {
            counter!("llm_errors_total", "op" => op, "kind" => e.kind()).increment(1);
            warn!(target: "llm", op, provider = provider.name(), error = %e, "LLM call failed");
            Err(e)
        }
    }
}

/// Short sha256 prefix so logs can correlate outputs without carrying them.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_cleans_provider_text() {
        let mock = MockProvider::fixed("```json\n{\"ok\":true}\n```");
        let out = complete(&mock, "test", "prompt", 10).await.unwrap();
        assert_eq!(out, "{\"ok\":true}");
        assert_eq!(mock.prompts(), vec!["prompt".to_string()]);
    }

    #[tokio::test]
    async fn complete_passes_errors_through() {
        let mock = MockProvider::sequence(vec![MockReply::Transport("connection refused".into())]);
        let err = complete(&mock, "test", "p", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }

    #[test]
    fn anon_hash_is_stable_and_short() {
        assert_eq!(anon_hash("abc"), anon_hash("abc"));
        assert_eq!(anon_hash("abc").len(), 12);
        assert_ne!(anon_hash("abc"), anon_hash("abd"));
    }
}
