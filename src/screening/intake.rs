use tracing::{info, warn};

use crate::agents::usable_title;
use crate::db::{self, Job};
use crate::error::AppError;
use crate::state::AppState;
use crate::storage::{save_upload, UploadedFile};

/// Input for [`create_job`]; every field may be missing or blank.
#[derive(Debug, Default)]
pub struct JobSubmission {
    pub company: Option<String>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub file: Option<UploadedFile>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn create_job(state: &AppState, submission: JobSubmission) -> Result<Job, AppError> {
    let company = non_blank(submission.company);
    let mut description = non_blank(submission.description);

    if let Some(file) = submission.file.filter(|f| !f.filename.is_empty()) {
        let (filename, path) = save_upload(&state.config.upload_folder, &file.filename, &file.data)?;
        info!("Saved job description upload {}", filename);
        if description.is_none() {
            description = non_blank(Some(state.reader.text_by_extension(&path)));
        }
    }

    let (Some(company), Some(description)) = (company, description) else {
        return Err(AppError::validation("Missing required fields"));
    };

    let title = match non_blank(submission.title) {
        Some(title) => title,
        None => resolve_title(state, &description).await?,
    };

    let job = db::create_job(&state.pool, &title, &company, &description).await?;
    info!("Created job {} ({} at {})", job.id, job.title, job.company);
    Ok(job)
}

/// Asks the model for a title; any unusable answer falls back to
/// `Job Description {n}` numbered after the existing jobs.
async fn resolve_title(state: &AppState, description: &str) -> Result<String, AppError> {
    let extracted = match state.analyzer.extract_job_title(description).await {
        Ok(raw) => usable_title(&raw),
        Err(e) => {
            warn!("Error extracting job title: {}", e);
            None
        }
    };

    match extracted {
        Some(title) => Ok(title),
        None => {
            let job_count = db::count_jobs(&state.pool).await? + 1;
            Ok(format!("Job Description {}", job_count))
        }
    }
}

pub async fn list_jobs(state: &AppState) -> Result<Vec<Job>, AppError> {
    Ok(db::list_jobs(&state.pool).await?)
}

pub async fn delete_job(state: &AppState, job_id: i64) -> Result<(), AppError> {
    if db::delete_job(&state.pool, job_id).await? {
        info!("Deleted job {} with its candidates", job_id);
        Ok(())
    } else {
        Err(AppError::not_found("Job not found"))
    }
}
