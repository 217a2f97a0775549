// tests/common/mod.rs
//
// Shared helpers: in-process router calls and throwaway HTTP peers bound to
// 127.0.0.1:0 standing in for the LLM service and the governance relay.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    body::{self, Body},
    extract::State,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tower::ServiceExt as _; // for `oneshot`

use party_match::config::LlmConfig;
use party_match::llm::DynLlm;
use party_match::programmes::PartyProgramme;
use party_match::vote::{VoteBackend, VoteTally};
use party_match::AppState;

pub const BODY_LIMIT: usize = 1024 * 1024;
pub const SUMMARY: &str = "SPD\n- Rente\n- Mindestlohn\n- Wohnungsbau";

pub fn programmes() -> Vec<PartyProgramme> {
    vec![
        PartyProgramme::new("SPD"),
        PartyProgramme::new("CDU/CSU"),
        PartyProgramme::new(" Die Linke "),
    ]
}

pub fn state_with(llm: DynLlm, vote: VoteBackend) -> AppState {
    AppState::new(
        programmes(),
        SUMMARY,
        llm,
        LlmConfig::default(),
        vote,
        PathBuf::from("static"),
    )
}

pub fn tally_state(llm: DynLlm) -> AppState {
    let vote = VoteBackend::Tally(Arc::new(VoteTally::from_programmes(&programmes())));
    state_with(llm, vote)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    send(app, req).await
}

pub async fn post_raw(app: &Router, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build POST");
    send(app, req).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get(app, uri).await;
    (status, parse(&bytes))
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, bytes) = post_raw(app, uri, &body.to_string()).await;
    (status, parse(&bytes))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(bytes)))
}

/// A fake upstream that records every JSON body it receives and answers with
/// a fixed status and raw body.
#[derive(Clone)]
pub struct FakePeer {
    pub base_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakePeer {
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct PeerState {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn peer_handler(State(st): State<PeerState>, Json(body): Json<Value>) -> impl IntoResponse {
    st.received.lock().unwrap().push(body);
    (st.status, st.body.clone())
}

pub async fn spawn_peer(path: &str, status: StatusCode, body: &str) -> FakePeer {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().route(path, post(peer_handler)).with_state(PeerState {
        status,
        body: body.to_string(),
        received: received.clone(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake peer");
    let addr = listener.local_addr().expect("peer addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake peer");
    });

    FakePeer {
        base_url: format!("http://{addr}"),
        received,
    }
}
