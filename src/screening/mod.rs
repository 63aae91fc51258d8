//! Recruiter-facing workflow: job intake, resume ingestion, result queries,
//! and candidate outreach. Handlers in `routes` are thin wrappers over these.

pub mod ingest;
pub mod intake;
pub mod outreach;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::db::{self, CandidateWithAnalysis, Job, ShortlistEntry};
use crate::error::AppError;
use crate::state::AppState;

/// Scores at or above this are shortlisted; everything below is rejected.
pub const SHORTLIST_THRESHOLD: i64 = 65;

pub fn is_shortlisted(score: i64) -> bool {
    score >= SHORTLIST_THRESHOLD
}

pub async fn get_results(
    state: &AppState,
    job_id: i64,
) -> Result<Vec<CandidateWithAnalysis>, AppError> {
    db::get_job(&state.pool, job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Job not found"))?;
    Ok(db::get_job_candidates(&state.pool, job_id).await?)
}

pub async fn get_shortlisted(state: &AppState) -> Result<Vec<ShortlistEntry>, AppError> {
    Ok(db::get_shortlisted(&state.pool).await?)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobSummary {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub total_applicants: usize,
    pub shortlisted_count: usize,
    pub rejected_count: usize,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct DashboardSummary {
    pub total_jobs: i64,
    pub total_apps: i64,
    pub jobs_summary: Vec<JobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-job tallies. Candidates without an analysis count as applicants only.
pub fn summarize_job(job: &Job, candidates: &[CandidateWithAnalysis]) -> JobSummary {
    let scores: Vec<i64> = candidates
        .iter()
        .filter_map(|c| c.analysis.as_ref())
        .map(|a| a.score)
        .collect();

    let shortlisted_count = scores.iter().filter(|s| is_shortlisted(**s)).count();
    let avg_score = if scores.is_empty() {
        0.0
    } else {
        let mean = scores.iter().sum::<i64>() as f64 / scores.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    JobSummary {
        id: job.id,
        title: job.title.clone(),
        company: job.company.clone(),
        total_applicants: candidates.len(),
        shortlisted_count,
        rejected_count: scores.len() - shortlisted_count,
        avg_score,
    }
}

async fn load_dashboard(pool: &SqlitePool) -> Result<DashboardSummary, sqlx::Error> {
    let total_jobs = db::count_jobs(pool).await?;
    let total_apps = db::count_candidates(pool).await?;

    let mut jobs_summary = Vec::new();
    for job in db::list_jobs(pool).await? {
        match db::get_job_candidates(pool, job.id).await {
            Ok(candidates) => jobs_summary.push(summarize_job(&job, &candidates)),
            Err(e) => {
                warn!("Error processing job {}: {}", job.id, e);
                continue;
            }
        }
    }

    Ok(DashboardSummary {
        total_jobs,
        total_apps,
        jobs_summary,
        error: None,
    })
}

/// Never fails: a broken store yields an empty summary carrying an error.
pub async fn dashboard_summary(state: &AppState) -> DashboardSummary {
    match load_dashboard(&state.pool).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Error loading dashboard: {}", e);
            DashboardSummary {
                error: Some("Failed to load dashboard data. Please try again.".to_string()),
                ..DashboardSummary::default()
            }
        }
    }
}
