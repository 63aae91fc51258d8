use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

use crate::screening::dashboard_summary;
use crate::state::AppState;
use crate::storage::stored_upload;

pub async fn index() -> impl IntoResponse {
    render_template("index.html", Context::new())
}

pub async fn jobs_page() -> impl IntoResponse {
    render_template("jobs.html", Context::new())
}

pub async fn resumes_page() -> impl IntoResponse {
    render_template("resumes.html", Context::new())
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summary = dashboard_summary(&state).await;

    let mut ctx = Context::new();
    ctx.insert("total_jobs", &summary.total_jobs);
    ctx.insert("total_apps", &summary.total_apps);
    ctx.insert("jobs_summary", &summary.jobs_summary);
    if let Some(error) = &summary.error {
        ctx.insert("error", error);
    }
    render_template("dashboard.html", ctx)
}

pub async fn letters_page() -> impl IntoResponse {
    render_template("letter.html", Context::new())
}

#[derive(Deserialize)]
pub struct LetterForm {
    job_description: Option<String>,
    resume_text: Option<String>,
}

pub async fn letters_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LetterForm>,
) -> impl IntoResponse {
    let mut ctx = Context::new();

    let job_description = form.job_description.unwrap_or_default();
    let resume_text = form.resume_text.unwrap_or_default();
    if job_description.trim().is_empty() || resume_text.trim().is_empty() {
        ctx.insert("error", "Both job description and resume text are required.");
        return render_template("letter.html", ctx);
    }

    match state.analyzer.analyze(&job_description, &resume_text).await {
        Ok(result) => ctx.insert("result", &result),
        Err(e) => {
            tracing::warn!("Letter analysis failed: {}", e);
            ctx.insert("error", "Analysis failed. Please try again.");
        }
    }
    ctx.insert("job_description", &job_description);
    ctx.insert("resume_text", &resume_text);
    render_template("letter.html", ctx)
}

pub async fn download_resume(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    let Some(path) = stored_upload(&state.config.upload_folder, &filename) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&filename)
                .first_raw()
                .unwrap_or("application/octet-stream");
            (
                [
                    ("Content-Type", mime.to_string()),
                    (
                        "Content-Disposition",
                        format!("inline; filename=\"{}\"", filename),
                    ),
                ],
                content,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn render_template(name: &str, ctx: Context) -> Response {
    let tera = crate::templates::get_tera();
    match tera.render(name, &ctx) {
        Ok(rendered) => Html(rendered).into_response(),
        Err(e) => {
            tracing::error!("Template error in {}: {:?}", name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Template error: {}", name)),
            )
                .into_response()
        }
    }
}
