// src/programmes.rs
//! Party programme records, loaded once at startup from a JSON array.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One party programme. Only `party` is required; every other field is kept
/// as-is so `/api/party_programmes` can return the file verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyProgramme {
    pub party: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PartyProgramme {
    pub fn new(party: impl Into<String>) -> Self {
        Self {
            party: party.into(),
            details: Map::new(),
        }
    }

    /// Display name with surrounding whitespace removed.
    pub fn canonical_name(&self) -> &str {
        self.party.trim()
    }
}

pub fn load_from_file(path: &Path) -> Result<Vec<PartyProgramme>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading party programmes from {}", path.display()))?;
    parse_programmes(&content)
        .with_context(|| format!("parsing party programmes at {}", path.display()))
}

pub fn parse_programmes(s: &str) -> Result<Vec<PartyProgramme>> {
    let list: Vec<PartyProgramme> = serde_json::from_str(s)?;
    if let Some(i) = list.iter().position(|p| p.canonical_name().is_empty()) {
        return Err(anyhow!("programme #{i} has an empty party name"));
    }
    Ok(list)
}

/// Canonical names in load order.
pub fn party_names(programmes: &[PartyProgramme]) -> Vec<String> {
    programmes
        .iter()
        .map(|p| p.canonical_name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_fields_survive_a_round_trip() {
        let raw = r#"[{"party":" SPD ","focus":["Rente","Mindestlohn"],"founded":1863}]"#;
        let list = parse_programmes(raw).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].canonical_name(), "SPD");
        assert_eq!(list[0].details["founded"], 1863);

        let back = serde_json::to_value(&list).unwrap();
        assert_eq!(back[0]["party"], " SPD ");
        assert_eq!(back[0]["focus"][1], "Mindestlohn");
    }

    #[test]
    fn missing_party_key_is_rejected() {
        assert!(parse_programmes(r#"[{"name":"CDU"}]"#).is_err());
    }

    #[test]
    fn blank_party_name_is_rejected() {
        let err = parse_programmes(r#"[{"party":"Grüne"},{"party":"   "}]"#).unwrap_err();
        assert!(err.to_string().contains("#1"), "{err}");
    }

    #[test]
    fn names_keep_load_order() {
        let list = vec![PartyProgramme::new("CDU "), PartyProgramme::new(" Die Linke")];
        assert_eq!(party_names(&list), vec!["CDU", "Die Linke"]);
    }
}
