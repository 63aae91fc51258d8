use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub resume_filename: String,
    pub job_id: i64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: i64,
    pub score: i64,
    pub verdict: String,
    pub summary: String,
    pub feedback: String,
    /// JSON-encoded list of skill names.
    pub missing_skills: Option<String>,
    pub candidate_id: i64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn missing_skills_list(&self) -> Vec<String> {
        self.missing_skills
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }
}

/// Insert payload for an analysis row.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub score: i64,
    pub verdict: String,
    pub summary: String,
    pub feedback: String,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CandidateWithAnalysis {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub analysis: Option<AnalysisResult>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShortlistEntry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub resume_filename: String,
    pub job_title: String,
    pub company: String,
    pub job_id: i64,
    pub score: i64,
    pub verdict: String,
    pub summary: String,
}

/// Candidate joined with the job it applied to, used for outbound mail.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateContact {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub job_title: String,
    pub company: String,
}
