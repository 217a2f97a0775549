// src/vote/signed.rs
//! Signed vote submission: build typed data, sign it, forward it to the relay.

use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::keystore::VoteSigner;
use super::typed_data::TypedVote;
use crate::config::VoteConfig;
use crate::error::ApiError;

pub const MIN_CHOICE: u32 = 1;
pub const MAX_CHOICE: u32 = 5;
/// Neutral midpoint of the 1..=5 scale.
pub const DEFAULT_CHOICE: u32 = 3;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignedVoteRequest {
    #[serde(default)]
    pub choice: Option<u32>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Envelope accepted by the governance relay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayEnvelope {
    pub address: String,
    /// Typed data serialized to a JSON string.
    pub msg: String,
    pub sig: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
}

pub struct SignedVoter {
    signer: VoteSigner,
    cfg: VoteConfig,
    http: reqwest::Client,
}

impl SignedVoter {
    pub fn new(signer: VoteSigner, cfg: &VoteConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("party-match/", env!("CARGO_PKG_VERSION")));
        if let Some(t) = cfg.relay_timeout() {
            builder = builder.timeout(t);
        }
        Ok(Self {
            signer,
            cfg: cfg.clone(),
            http: builder.build()?,
        })
    }

    pub fn signer_address(&self) -> String {
        self.signer.address_checksummed()
    }

    /// Validate, build and sign one vote at the given unix timestamp.
    pub fn prepare(&self, req: &SignedVoteRequest, timestamp: u64) -> Result<RelayEnvelope, ApiError> {
        let choice = req.choice.unwrap_or(DEFAULT_CHOICE);
        if !(MIN_CHOICE..=MAX_CHOICE).contains(&choice) {
            return Err(ApiError::BadRequest(format!(
                "choice must be between {MIN_CHOICE} and {MAX_CHOICE}, got {choice}"
            )));
        }
        let reason = req.reason.as_deref().unwrap_or_default();

        let typed = TypedVote::new(&self.cfg, choice, reason, timestamp);
        let sig = self
            .signer
            .sign_hash(&typed.signing_hash())
            .map_err(|e| ApiError::Signing(e.to_string()))?;
        let msg = serde_json::to_string(&typed).map_err(|e| ApiError::Signing(e.to_string()))?;

        Ok(RelayEnvelope {
            address: self.signer.address_checksummed(),
            msg,
            sig: format!("0x{}", hex::encode(sig)),
            version: self.cfg.protocol_version.clone(),
            kind: "vote".to_string(),
        })
    }

    /// Sign the vote and relay it; the relay's JSON reply is returned as-is.
    pub async fn submit(&self, req: &SignedVoteRequest) -> Result<Value, ApiError> {
        let envelope = self.prepare(req, unix_now())?;

        let resp = self
            .http
            .post(&self.cfg.relay_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| ApiError::Relay(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Relay(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Relay(format!("HTTP {status} | Response text: {body}")));
        }
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            ApiError::Relay(format!("invalid JSON from relay: {e} | Response text: {body}"))
        })?;

        counter!("votes_recorded_total", "mode" => "signed").increment(1);
        info!(address = %envelope.address, "signed vote relayed");
        Ok(value)
    }
}

fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}
