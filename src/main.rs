//! party-match — Binary Entrypoint
//! Boots the Axum HTTP server: config, programmes, startup summary, vote backend.

use party_match::{api, telemetry, AppConfig, AppState};
use shuttle_axum::ShuttleAxum;
use tracing::info;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let cfg = AppConfig::load()?;
    info!(
        llm_url = %cfg.llm.url,
        model = %cfg.llm.model,
        vote_mode = cfg.vote.mode.as_str(),
        "starting party-match"
    );

    let state = AppState::bootstrap(&cfg).await?;
    let router = api::router(state);

    Ok(router.into())
}
