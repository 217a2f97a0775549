// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod llm;
pub mod metrics;
pub mod programmes;
pub mod prompts;
pub mod questions;
pub mod summarizer;
pub mod telemetry;
pub mod vote;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::error::{ApiError, LlmError};

use axum::Router;

/// Build the full application the way the binary does: config from
/// `config/app.toml` + env, programmes from disk, one summary call.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = AppConfig::load()?;
    let state = AppState::bootstrap(&cfg).await?;
    Ok(router(state))
}
