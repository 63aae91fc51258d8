use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use super::AgentError;

/// Structured fit assessment returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateAnalysis {
    #[serde(deserialize_with = "lenient_score")]
    pub relevance_score: i64,
    #[serde(default)]
    pub fit_verdict: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub personalized_feedback: String,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

/// Accepts `78`, `78.4`, `"78"` or `"78%"` and clamps into 0..=100.
fn lenient_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let score = match &raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| serde::de::Error::custom(format!("invalid relevance_score: {raw}")))?;

    Ok(score.round().clamp(0.0, 100.0) as i64)
}

/// Pulls the JSON object out of a model reply, tolerating code fences and
/// chatter around it.
pub fn parse_analysis(reply: &str) -> Result<CandidateAnalysis, AgentError> {
    let start = reply.find('{').ok_or(AgentError::NoJson)?;
    let end = reply.rfind('}').ok_or(AgentError::NoJson)?;
    if end < start {
        return Err(AgentError::NoJson);
    }
    let analysis: CandidateAnalysis = serde_json::from_str(&reply[start..=end])?;
    Ok(analysis)
}

fn rejected_title_markers() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(no job title|quota|429|rate limit|^\s*error)")
            .expect("title marker pattern is valid")
    })
}

/// Screens a raw title-extraction answer. Returns `None` when the answer is
/// blank, looks like an error message, or reports that no title was found.
pub fn usable_title(raw: &str) -> Option<String> {
    let title = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if title.is_empty() || rejected_title_markers().is_match(title) {
        return None;
    }
    let first_line = title.lines().next().unwrap_or(title).trim();
    Some(first_line.chars().take(150).collect())
}
