// src/vote/mod.rs
//! Vote recording backends. Exactly one serves `POST /api/vote`, chosen by
//! `vote.mode` in the config.

pub mod keystore;
pub mod signed;
pub mod tally;
pub mod typed_data;

use std::sync::Arc;

use tracing::info;

use crate::config::{VoteConfig, VoteMode};
use crate::programmes::PartyProgramme;

pub use keystore::{load_or_create, SignError, VoteSigner};
pub use signed::{SignedVoteRequest, SignedVoter, DEFAULT_CHOICE};
pub use tally::{TallyError, VoteReceipt, VoteTally};

#[derive(Clone)]
pub enum VoteBackend {
    Tally(Arc<VoteTally>),
    Signed(Arc<SignedVoter>),
}

impl VoteBackend {
    /// Build the configured backend. Signed mode loads (or creates) the key file.
    pub fn from_config(cfg: &VoteConfig, programmes: &[PartyProgramme]) -> anyhow::Result<Self> {
        let backend = match cfg.mode {
            VoteMode::Tally => VoteBackend::Tally(Arc::new(VoteTally::from_programmes(programmes))),
            VoteMode::Signed => {
                let signer = load_or_create(&cfg.key_path)?;
                VoteBackend::Signed(Arc::new(SignedVoter::new(signer, cfg)?))
            }
        };
        info!(mode = backend.mode().as_str(), "vote backend ready");
        Ok(backend)
    }

    pub fn mode(&self) -> VoteMode {
        match self {
            VoteBackend::Tally(_) => VoteMode::Tally,
            VoteBackend::Signed(_) => VoteMode::Signed,
        }
    }
}
