// tests/llm_upstream_errors.rs
//
// The real Ollama provider against a fake LLM service on 127.0.0.1:0.
// Broken upstream replies must surface as `{"error": ...}` payloads carrying
// the parse detail and the raw offending text, never as a panic.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::{get_json, post_json, spawn_peer, tally_state};
use party_match::config::LlmConfig;
use party_match::llm::OllamaProvider;
use party_match::router;

fn provider_for(base_url: &str) -> Arc<OllamaProvider> {
    let cfg = LlmConfig {
        url: format!("{base_url}/api/generate"),
        model: "test-model".to_string(),
        timeout_secs: 5,
        ..LlmConfig::default()
    };
    Arc::new(OllamaProvider::new(&cfg).expect("build provider"))
}

#[tokio::test]
async fn non_json_envelope_on_questions() {
    let peer = spawn_peer("/api/generate", StatusCode::OK, "<html>Bad Gateway</html>").await;
    let app = router(tally_state(provider_for(&peer.base_url)));

    let (status, v) = get_json(&app, "/api/questions").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let err = v["error"].as_str().expect("error string");
    assert!(err.starts_with("Failed to decode JSON from LLM service:"), "{err}");
    assert!(err.contains("expected value"), "{err}");
    assert!(err.ends_with("| Response text: <html>Bad Gateway</html>"), "{err}");
}

#[tokio::test]
async fn non_json_envelope_on_submit_answers() {
    let peer = spawn_peer("/api/generate", StatusCode::OK, "upstream exploded").await;
    let app = router(tally_state(provider_for(&peer.base_url)));

    let (status, v) = post_json(&app, "/api/submit_answers", json!({ "answers": { "1": "Agree" } })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let err = v["error"].as_str().expect("error string");
    assert!(err.contains("expected value"), "{err}");
    assert!(err.contains("upstream exploded"), "{err}");
}

#[tokio::test]
async fn non_json_model_text_is_reported_with_output() {
    let envelope = json!({ "response": "The best fit is clearly the SPD." }).to_string();
    let peer = spawn_peer("/api/generate", StatusCode::OK, &envelope).await;
    let app = router(tally_state(provider_for(&peer.base_url)));

    let (status, v) = post_json(&app, "/api/submit_answers", json!({ "answers": {} })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let err = v["error"].as_str().unwrap();
    assert!(err.starts_with("Failed to parse JSON output:"), "{err}");
    assert!(err.ends_with("Output was: The best fit is clearly the SPD."), "{err}");
}

#[tokio::test]
async fn request_body_follows_generate_contract() {
    let envelope = json!({ "response": "{\"best_party\": \"SPD\"}" }).to_string();
    let peer = spawn_peer("/api/generate", StatusCode::OK, &envelope).await;
    let app = router(tally_state(provider_for(&peer.base_url)));

    let (status, v) = post_json(&app, "/api/submit_answers", json!({ "answers": {} })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["best_party"], "SPD");

    let sent = peer.received();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["model"], "test-model");
    assert_eq!(sent[0]["max_tokens"], 200);
    assert_eq!(sent[0]["stream"], false);
    assert!(sent[0]["prompt"].as_str().unwrap().contains("best_party"));
}

#[tokio::test]
async fn upstream_http_error_is_reported() {
    let peer = spawn_peer("/api/generate", StatusCode::SERVICE_UNAVAILABLE, "model loading").await;
    let app = router(tally_state(provider_for(&peer.base_url)));

    let (status, v) = get_json(&app, "/api/questions").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(v["error"], "LLM service returned HTTP 503 | Response text: model loading");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let app = router(tally_state(provider_for(&format!("http://{addr}"))));

    let (status, v) = get_json(&app, "/api/questions").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        v["error"].as_str().unwrap().starts_with("Request to LLM service failed:"),
        "{v}"
    );
}
