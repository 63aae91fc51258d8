use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::analysis::{parse_analysis, CandidateAnalysis};
use super::{AgentError, Analyzer};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const SCREENING_PROMPT: &str = r#"You are an experienced technical recruiter screening a candidate's resume
against a job description. Compare the resume with the requirements and respond with ONLY a JSON
object, no prose before or after it, using exactly these keys:

{
  "relevance_score": <integer 0-100, how well the resume matches the job>,
  "fit_verdict": <one of "Strong Fit", "Good Fit", "Moderate Fit", "Weak Fit", "Not a Fit">,
  "summary": <two or three sentences summarising the candidate for the recruiter>,
  "personalized_feedback": <constructive feedback addressed to the candidate, in second person>,
  "missing_skills": [<skills or qualifications the job asks for that the resume does not show>]
}

Score strictly: 65 or above means the recruiter should shortlist the candidate."#;

const TITLE_PROMPT: &str = r#"Extract the job title from the job description the user sends.
Respond with the job title only, on a single line, with no quotes or extra words.
If the description does not name a job title, respond with exactly: No job title found"#;

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeError {
    error: ClaudeErrorBody,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorBody {
    message: String,
}

/// Anthropic Messages API client. One attempt per call; callers decide what
/// a failure means for them.
#[derive(Clone)]
pub struct ClaudeAgent {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeAgent {
    pub fn new(api_key: String, model: String) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, AgentError> {
        let body = ClaudeRequest {
            model: &self.model,
            max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ClaudeError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            warn!("Claude API returned {} for model {}", status, self.model);
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ClaudeResponse = serde_json::from_str(&text)?;
        parsed
            .content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(AgentError::EmptyContent)
    }
}

#[async_trait]
impl Analyzer for ClaudeAgent {
    async fn analyze(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<CandidateAnalysis, AgentError> {
        info!(
            "Requesting analysis with model {} (resume length: {} chars)",
            self.model,
            resume_text.len()
        );
        let prompt = format!(
            "JOB DESCRIPTION:\n{}\n\nRESUME:\n{}",
            job_description, resume_text
        );
        let reply = self.complete(SCREENING_PROMPT, &prompt, 2000).await?;
        parse_analysis(&reply)
    }

    async fn extract_job_title(&self, description: &str) -> Result<String, AgentError> {
        let reply = self.complete(TITLE_PROMPT, description, 50).await?;
        Ok(reply.trim().to_string())
    }
}
