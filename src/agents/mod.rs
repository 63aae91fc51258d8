mod analysis;
mod claude;

pub use analysis::{parse_analysis, usable_title, CandidateAnalysis};
pub use claude::ClaudeAgent;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model reply did not contain a JSON object")]
    NoJson,

    #[error("model returned empty content")]
    EmptyContent,
}

/// The AI collaborator used by the screening workflow.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Assesses how well a resume fits a job description.
    async fn analyze(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<CandidateAnalysis, AgentError>;

    /// Returns the model's raw answer; see [`usable_title`] for screening it.
    async fn extract_job_title(&self, description: &str) -> Result<String, AgentError>;
}
