use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::JsonBody;
use crate::db::{CandidateWithAnalysis, Job, ShortlistEntry};
use crate::error::AppError;
use crate::screening::ingest::{upload_resumes, UploadSummary};
use crate::screening::intake::{self, JobSubmission};
use crate::screening::outreach::{self, BulkSendReport};
use crate::screening::{self, DashboardSummary};
use crate::state::AppState;
use crate::storage::UploadedFile;

#[derive(Deserialize)]
pub struct CreateJobBody {
    title: Option<String>,
    company: Option<String>,
    description: Option<String>,
}

/// Accepts the job form as multipart (with an optional document) or JSON.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("multipart/form-data"));

    let submission = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        job_form(multipart).await
    } else {
        let JsonBody(body) = JsonBody::<CreateJobBody>::from_request(request, &state).await?;
        JobSubmission {
            company: body.company,
            description: body.description,
            title: body.title,
            file: None,
        }
    };

    let job = intake::create_job(&state, submission).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

async fn job_form(mut multipart: Multipart) -> JobSubmission {
    let mut submission = JobSubmission::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "company-name" => submission.company = field.text().await.ok(),
            "job-description" => submission.description = field.text().await.ok(),
            "job-title" => submission.title = field.text().await.ok(),
            "file-upload" => {
                let filename = field.file_name().unwrap_or("").to_string();
                if let Ok(data) = field.bytes().await {
                    submission.file = Some(UploadedFile {
                        filename,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }
    submission
}

pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(intake::list_jobs(&state).await?))
}

pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    intake::delete_job(&state, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadSummary>), AppError> {
    let mut job_id: Option<String> = None;
    let mut files: Option<Vec<UploadedFile>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        if name == "job_id" {
            job_id = field.text().await.ok();
        } else if name == "resumes" || name == "resumes[]" {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            files
                .get_or_insert_with(Vec::new)
                .push(UploadedFile { filename, data });
        }
    }

    let files = files.ok_or_else(|| AppError::validation("No resume files provided"))?;
    let job_id = job_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("No job ID provided"))?;
    let job_id: i64 = job_id
        .parse()
        .map_err(|_| AppError::not_found("Job not found"))?;

    let summary = upload_resumes(&state, job_id, files).await?;
    Ok((StatusCode::ACCEPTED, Json(summary)))
}

pub async fn results(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<Json<Vec<CandidateWithAnalysis>>, AppError> {
    Ok(Json(screening::get_results(&state, job_id).await?))
}

pub async fn shortlisted(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShortlistEntry>>, AppError> {
    Ok(Json(screening::get_shortlisted(&state).await?))
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSummary> {
    Json(screening::dashboard_summary(&state).await)
}

#[derive(Deserialize)]
pub struct EmailBody {
    email: Option<String>,
}

pub async fn update_email(
    State(state): State<Arc<AppState>>,
    Path(candidate_id): Path<i64>,
    JsonBody(body): JsonBody<EmailBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let email = outreach::update_email(&state, candidate_id, body.email.as_deref()).await?;
    Ok(Json(json!({
        "message": "Email updated successfully",
        "email": email,
    })))
}

#[derive(Deserialize)]
pub struct SendEmailsBody {
    #[serde(default)]
    candidate_ids: Vec<i64>,
}

pub async fn send_emails(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<SendEmailsBody>,
) -> Result<Json<BulkSendReport>, AppError> {
    Ok(Json(outreach::send_emails(&state, &body.candidate_ids).await?))
}

pub async fn test_email(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<EmailBody>,
) -> Result<Response, AppError> {
    let status = outreach::send_test_email(&state, body.email.as_deref()).await?;
    let response = if status.success {
        (
            StatusCode::OK,
            Json(json!({ "success": true, "message": status.message })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": status.message })),
        )
    };
    Ok(response.into_response())
}
