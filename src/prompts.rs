// src/prompts.rs
//! Prompt text for the three LLM operations.

use std::collections::BTreeMap;

use crate::programmes::PartyProgramme;

pub(crate) const SUMMARY_LEAD: &str = "Summarize the following party programmes.";
pub(crate) const QUESTIONS_LEAD: &str = "Generate a JSON array of 10 Likert-scale questions";
pub(crate) const MATCH_LEAD: &str =
    "Based on the following programme summary and user answers";

pub fn summary_prompt(programmes: &[PartyProgramme]) -> String {
    let data = serde_json::to_string(programmes).unwrap_or_else(|_| "[]".to_string());
    format!(
        "{SUMMARY_LEAD} For each party, provide exactly 3 bullet points (using '-' for bullets) \
         that capture its key points. Format your answer as plain text, listing the party name on its own line, \
         followed by its 3 bullet points (each on a new line). Do not include any extra explanation or commentary. \
         Party programmes: {data}"
    )
}

pub fn questions_prompt(summary: &str) -> String {
    format!(
        "{QUESTIONS_LEAD} based on the following programme summary. \
         The questions are designed to determine which party or political direction the person is tending towards. \
         Each question must be a policy statement derived from the summary (for example, \
         \"Wealthy people should be taxed at 60% or more. Do you agree?\") and include the fixed answer options: \
         \"Strongly Disagree\", \"Disagree\", \"Neutral\", \"Agree\", \"Strongly Agree\". \
         Each question object must have an 'id' (unique integer), 'text' (the statement), and an 'options' array with these 5 choices. \
         Return only raw JSON without extra text. This is important, return only the JSON, no other text! \
         Programme summary: {summary}"
    )
}

pub fn match_prompt(
    summary: &str,
    available_parties: &[String],
    answers: &BTreeMap<String, String>,
) -> String {
    let available = available_parties.join(", ");
    let answers = serde_json::to_string(answers).unwrap_or_else(|_| "{}".to_string());
    format!(
        "{MATCH_LEAD}, determine which party best matches the user's views. \
         Available parties: {available}. \
         Output a JSON object exactly in the format: {{\"best_party\": \"<PartyName>\"}} where <PartyName> is one of the available parties. \
         Do not include any extra text. \
         Programme summary: {summary} User answers: {answers}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_embeds_programmes_json() {
        let p = summary_prompt(&[PartyProgramme::new("Volt")]);
        assert!(p.starts_with(SUMMARY_LEAD));
        assert!(p.contains("exactly 3 bullet points"));
        assert!(p.ends_with(r#"Party programmes: [{"party":"Volt"}]"#), "{p}");
    }

    #[test]
    fn questions_prompt_lists_all_likert_labels() {
        let p = questions_prompt("SPD\n- Rente");
        for label in crate::questions::LIKERT_OPTIONS {
            assert!(p.contains(&format!("\"{label}\"")), "missing {label}");
        }
        assert!(p.ends_with("Programme summary: SPD\n- Rente"));
    }

    #[test]
    fn match_prompt_lists_parties_and_answers() {
        let mut answers = BTreeMap::new();
        answers.insert("1".to_string(), "Agree".to_string());
        let p = match_prompt("sum", &["SPD".into(), "Die Linke".into()], &answers);
        assert!(p.starts_with(MATCH_LEAD));
        assert!(p.contains("Available parties: SPD, Die Linke."));
        assert!(p.contains(r#"{"best_party": "<PartyName>"}"#));
        assert!(p.ends_with(r#"User answers: {"1":"Agree"}"#));
    }
}
