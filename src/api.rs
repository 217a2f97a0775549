// src/api.rs
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::config::{AppConfig, LlmConfig};
use crate::error::ApiError;
use crate::evaluator::{self, MatchResult, UserAnswerSet};
use crate::llm::{self, DynLlm};
use crate::metrics::Metrics;
use crate::programmes::{self, PartyProgramme};
use crate::questions::{self, SurveyQuestion};
use crate::summarizer;
use crate::vote::{SignedVoteRequest, VoteBackend};

/// Everything a handler needs; created once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub programmes: Arc<Vec<PartyProgramme>>,
    pub party_names: Arc<Vec<String>>,
    /// Generated once at startup; holds the error sentence if that call failed.
    pub summary: Arc<str>,
    pub llm: DynLlm,
    pub llm_cfg: Arc<LlmConfig>,
    pub vote: VoteBackend,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        programmes: Vec<PartyProgramme>,
        summary: impl Into<Arc<str>>,
        llm: DynLlm,
        llm_cfg: LlmConfig,
        vote: VoteBackend,
        static_dir: PathBuf,
    ) -> Self {
        let party_names = programmes::party_names(&programmes);
        Self {
            programmes: Arc::new(programmes),
            party_names: Arc::new(party_names),
            summary: summary.into(),
            llm,
            llm_cfg: Arc::new(llm_cfg),
            vote,
            static_dir,
        }
    }

    /// Load programmes, build the LLM provider, summarize, and set up voting.
    pub async fn bootstrap(cfg: &AppConfig) -> anyhow::Result<Self> {
        let programmes = programmes::load_from_file(&cfg.server.programmes_path)?;
        info!(
            count = programmes.len(),
            path = %cfg.server.programmes_path.display(),
            "party programmes loaded"
        );
        let names = programmes::party_names(&programmes);
        let provider = llm::build_provider(&cfg.llm, &names)?;
        let vote = VoteBackend::from_config(&cfg.vote, &programmes)?;

        let summary = summarizer::summary_or_error_text(
            provider.as_ref(),
            &programmes,
            cfg.llm.summary_max_tokens,
        )
        .await;

        Ok(Self::new(
            programmes,
            summary,
            provider,
            cfg.llm.clone(),
            vote,
            cfg.server.static_dir.clone(),
        ))
    }
}

pub fn router(state: AppState) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);
    let metrics = Metrics::init();

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/party_programmes", get(get_programmes))
        .route("/api/summaries", get(get_summaries))
        .route("/api/questions", get(get_questions))
        .route("/api/submit_answers", post(submit_answers))
        .route("/api/vote", post(vote))
        .route_service("/", index)
        .nest_service("/static", assets)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(metrics.router())
}

async fn get_programmes(State(state): State<AppState>) -> Json<Vec<PartyProgramme>> {
    Json(state.programmes.as_ref().clone())
}

async fn get_summaries(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "summary": state.summary.as_ref() }))
}

async fn get_questions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SurveyQuestion>>, ApiError> {
    let qs = questions::generate_questions(
        state.llm.as_ref(),
        &state.summary,
        state.llm_cfg.questions_max_tokens,
    )
    .await?;
    Ok(Json(qs))
}

#[derive(Debug, Deserialize)]
struct SubmitAnswersReq {
    #[serde(default)]
    answers: UserAnswerSet,
}

async fn submit_answers(
    State(state): State<AppState>,
    body: Result<Json<SubmitAnswersReq>, JsonRejection>,
) -> Result<Json<MatchResult>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let result = evaluator::evaluate_answers(
        state.llm.as_ref(),
        &state.summary,
        &state.party_names,
        &req.answers,
        state.llm_cfg.answers_max_tokens,
    )
    .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct TallyVoteReq {
    #[serde(default)]
    best_party: Option<String>,
}

async fn vote(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mode = state.vote.mode().as_str();

    let result = match &state.vote {
        VoteBackend::Tally(tally) => {
            let req: TallyVoteReq = parse_body(body)?;
            tally
                .record(req.best_party.as_deref())
                .map(|receipt| {
                    counter!("votes_recorded_total", "mode" => mode).increment(1);
                    info!(message = %receipt.message, "vote recorded");
                    Json(receipt).into_response()
                })
                .map_err(|e| ApiError::BadRequest(e.to_string()))
        }
        VoteBackend::Signed(voter) => {
            let req: SignedVoteRequest = parse_body(body)?;
            voter
                .submit(&req)
                .await
                .map(|relayed| Json(relayed).into_response())
        }
    };

    if let Err(ApiError::BadRequest(_)) = &result {
        counter!("vote_rejections_total", "mode" => mode).increment(1);
    }
    result
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))
}
