// src/llm/ollama.rs
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::config::LlmConfig;
use crate::error::LlmError;

/// Ollama `/api/generate` client (non-streaming).
pub struct OllamaProvider {
    http: reqwest::Client,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateReq<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResp {
    #[serde(default)]
    response: String,
}

impl OllamaProvider {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("party-match/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = cfg.timeout() {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
            url: cfg.url.clone(),
            model: cfg.model.clone(),
        })
    }
}

impl LlmProvider for OllamaProvider {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            let req = GenerateReq {
                model: &self.model,
                prompt,
                max_tokens,
                stream: false,
            };

            let resp = self
                .http
                .post(&self.url)
                .json(&req)
                .send()
                .await
                .map_err(|e| LlmError::Transport(e.to_string()))?;

            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| LlmError::Transport(e.to_string()))?;

            if !status.is_success() {
                return Err(LlmError::UpstreamStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: GenerateResp =
                serde_json::from_str(&body).map_err(|e| LlmError::UpstreamDecode {
                    detail: e.to_string(),
                    body: body.clone(),
                })?;
            Ok(parsed.response)
        })
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
