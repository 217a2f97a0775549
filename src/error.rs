// src/error.rs
//! Error kinds shared by the LLM-backed operations and the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of one LLM round trip, from transport up to output validation.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request to LLM service failed: {0}")]
    Transport(String),

    #[error("LLM service returned HTTP {status} | Response text: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Failed to decode JSON from LLM service: {detail} | Response text: {body}")]
    UpstreamDecode { detail: String, body: String },

    #[error("LLM returned an empty response.")]
    Empty,

    #[error("LLM returned undefined or empty response.")]
    Undefined,

    #[error("Failed to parse JSON output: {detail} | Output was: {output}")]
    InvalidOutput { detail: String, output: String },

    #[error("LLM output has an unexpected shape: {detail} | Output was: {output}")]
    Schema { detail: String, output: String },
}

impl LlmError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Transport(_) => "transport",
            LlmError::UpstreamStatus { .. } => "upstream_status",
            LlmError::UpstreamDecode { .. } => "upstream_decode",
            LlmError::Empty => "empty",
            LlmError::Undefined => "undefined",
            LlmError::InvalidOutput { .. } => "invalid_output",
            LlmError::Schema { .. } => "schema",
        }
    }
}

/// Errors returned by HTTP handlers. Every variant renders as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Relay submission failed: {0}")]
    Relay(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Llm(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Signing(_) | ApiError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
