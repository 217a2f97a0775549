// src/vote/tally.rs
//! In-memory vote tally keyed by canonical party name.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::llm::parse::is_undefined_sentinel;
use crate::programmes::PartyProgramme;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TallyError {
    #[error("No valid recommended party provided.")]
    MissingParty,
    #[error("Recommended party not found in mapping")]
    UnknownParty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub message: String,
    pub votes: BTreeMap<String, u64>,
}

#[derive(Debug)]
pub struct VoteTally {
    /// (lowercase name, canonical name), load order.
    names: Vec<(String, String)>,
    counts: Mutex<BTreeMap<String, u64>>,
}

impl VoteTally {
    pub fn from_programmes(programmes: &[PartyProgramme]) -> Self {
        let mut names = Vec::with_capacity(programmes.len());
        let mut counts = BTreeMap::new();
        for p in programmes {
            let canonical = p.canonical_name().to_string();
            names.push((canonical.to_lowercase(), canonical.clone()));
            counts.insert(canonical, 0);
        }
        Self {
            names,
            counts: Mutex::new(counts),
        }
    }

    /// Map a recommended party name onto a canonical one.
    ///
    /// Exact match on the lowercased, trimmed name first. Inputs mentioning
    /// "left" or "linke" fall back to the first party whose name contains either.
    pub fn resolve(&self, recommended: Option<&str>) -> Result<String, TallyError> {
        let raw = recommended.ok_or(TallyError::MissingParty)?;
        if raw.trim().is_empty() || is_undefined_sentinel(raw) {
            return Err(TallyError::MissingParty);
        }
        let norm = raw.trim().to_lowercase();

        if let Some((_, canonical)) = self.names.iter().find(|(lower, _)| *lower == norm) {
            return Ok(canonical.clone());
        }

        if norm.contains("left") || norm.contains("linke") {
            if let Some((_, canonical)) = self
                .names
                .iter()
                .find(|(lower, _)| lower.contains("linke") || lower.contains("left"))
            {
                return Ok(canonical.clone());
            }
        }
        Err(TallyError::UnknownParty)
    }

    /// Resolve and count one vote; returns the full tally after the increment.
    pub fn record(&self, recommended: Option<&str>) -> Result<VoteReceipt, TallyError> {
        let party = self.resolve(recommended)?;
        let mut counts = match self.counts.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *counts.entry(party.clone()).or_insert(0) += 1;
        Ok(VoteReceipt {
            message: format!("Vote recorded for {party}"),
            votes: counts.clone(),
        })
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        match self.counts.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
