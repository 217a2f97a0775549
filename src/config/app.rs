// src/config/app.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::Context;

// --- env defaults & names ---
pub const DEFAULT_APP_CONFIG_PATH: &str = "config/app.toml";
pub const ENV_APP_CONFIG_PATH: &str = "APP_CONFIG_PATH";

pub const ENV_OLLAMA_URL: &str = "OLLAMA_URL";
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";
pub const ENV_VOTE_MODE: &str = "VOTE_MODE";
pub const ENV_VOTE_KEY_PATH: &str = "VOTE_KEY_PATH";
pub const ENV_VOTE_RELAY_URL: &str = "VOTE_RELAY_URL";
pub const ENV_PROGRAMMES_PATH: &str = "PROGRAMMES_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub vote: VoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub programmes_path: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            programmes_path: PathBuf::from("data/party_programmes.json"),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama-style `/api/generate` endpoint.
    pub url: String,
    pub model: String,
    /// 0 disables the request timeout.
    pub timeout_secs: u64,
    pub summary_max_tokens: u32,
    pub questions_max_tokens: u32,
    pub answers_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/generate".to_string(),
            model: "llama3.2-vision:11b".to_string(),
            timeout_secs: 300,
            summary_max_tokens: 300,
            questions_max_tokens: 500,
            answers_max_tokens: 200,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.timeout_secs)
    }
}

/// Which vote backend serves `POST /api/vote`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteMode {
    /// In-memory per-party counter.
    #[default]
    Tally,
    /// EIP-712 signed message forwarded to the governance relay.
    Signed,
}

impl VoteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteMode::Tally => "tally",
            VoteMode::Signed => "signed",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tally" => Some(VoteMode::Tally),
            "signed" => Some(VoteMode::Signed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteConfig {
    pub mode: VoteMode,
    pub key_path: PathBuf,
    pub relay_url: String,
    pub relay_timeout_secs: u64,
    pub domain_name: String,
    pub domain_version: String,
    pub chain_id: u64,
    /// Fixed proposal identifier carried in every signed vote.
    pub proposal: String,
    /// Relay protocol version sent alongside the envelope.
    pub protocol_version: String,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            mode: VoteMode::Tally,
            key_path: PathBuf::from("secrets/vote_key.json"),
            relay_url: "https://seq.snapshot.org/".to_string(),
            relay_timeout_secs: 30,
            domain_name: "party-match".to_string(),
            domain_version: "1".to_string(),
            chain_id: 1,
            proposal: "party-match-survey".to_string(),
            protocol_version: "0.1.4".to_string(),
        }
    }
}

impl VoteConfig {
    pub fn relay_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.relay_timeout_secs)
    }
}

fn secs_to_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl AppConfig {
    /// Resolve the config path from `APP_CONFIG_PATH` (default `config/app.toml`),
    /// read it if present, then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var(ENV_APP_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_APP_CONFIG_PATH));

        let mut cfg = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading app config from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing app config at {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.llm.url = cfg.llm.url.trim().to_string();
        cfg.vote.relay_url = cfg.vote.relay_url.trim().to_string();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = non_empty_env(ENV_OLLAMA_URL) {
            self.llm.url = v;
        }
        if let Some(v) = non_empty_env(ENV_OLLAMA_MODEL) {
            self.llm.model = v;
        }
        if let Some(v) = non_empty_env(ENV_VOTE_MODE) {
            match VoteMode::parse(&v) {
                Some(mode) => self.vote.mode = mode,
                None => tracing::warn!(value = %v, "ignoring unknown VOTE_MODE"),
            }
        }
        if let Some(v) = non_empty_env(ENV_VOTE_KEY_PATH) {
            self.vote.key_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty_env(ENV_VOTE_RELAY_URL) {
            self.vote.relay_url = v;
        }
        if let Some(v) = non_empty_env(ENV_PROGRAMMES_PATH) {
            self.server.programmes_path = PathBuf::from(v);
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
