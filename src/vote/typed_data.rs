// src/vote/typed_data.rs
//! EIP-712 vote message: Solidity-typed structs for hashing plus the JSON
//! `{domain, types, message}` form the relay expects.

use std::borrow::Cow;

use alloy_primitives::{B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::VoteConfig;

sol! {
    struct VotePayload {
        string proposal;
        uint32 choice;
        string reason;
    }

    struct Vote {
        uint64 timestamp;
        VotePayload payload;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainJson {
    pub name: String,
    pub version: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadJson {
    pub proposal: String,
    pub choice: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageJson {
    pub timestamp: u64,
    pub payload: PayloadJson,
}

/// Serializable typed data; `types` mirrors the `sol!` definitions above.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedVote {
    pub domain: DomainJson,
    pub types: Value,
    pub message: MessageJson,
}

impl TypedVote {
    pub fn new(cfg: &VoteConfig, choice: u32, reason: &str, timestamp: u64) -> Self {
        Self {
            domain: DomainJson {
                name: cfg.domain_name.clone(),
                version: cfg.domain_version.clone(),
                chain_id: cfg.chain_id,
            },
            types: vote_types(),
            message: MessageJson {
                timestamp,
                payload: PayloadJson {
                    proposal: cfg.proposal.clone(),
                    choice,
                    reason: reason.to_string(),
                },
            },
        }
    }

    pub fn eip712_domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Owned(self.domain.name.clone())),
            Some(Cow::Owned(self.domain.version.clone())),
            Some(U256::from(self.domain.chain_id)),
            None,
            None,
        )
    }

    pub fn to_sol(&self) -> Vote {
        let p = &self.message.payload;
        Vote {
            timestamp: self.message.timestamp,
            payload: VotePayload {
                proposal: p.proposal.clone(),
                choice: p.choice,
                reason: p.reason.clone(),
            },
        }
    }

    /// The digest that gets signed: `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(vote))`.
    pub fn signing_hash(&self) -> B256 {
        self.to_sol().eip712_signing_hash(&self.eip712_domain())
    }
}

fn vote_types() -> Value {
    json!({
        "Vote": [
            { "name": "timestamp", "type": "uint64" },
            { "name": "payload", "type": "VotePayload" }
        ],
        "VotePayload": [
            { "name": "proposal", "type": "string" },
            { "name": "choice", "type": "uint32" },
            { "name": "reason", "type": "string" }
        ]
    })
}
