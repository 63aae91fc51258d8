mod api;
mod pages;

use axum::{
    extract::{DefaultBodyLimit, FromRequest},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// `axum::Json` request body whose rejection is a `VALIDATION_ERROR`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Pages
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/jobs", get(pages::jobs_page))
        .route("/resumes", get(pages::resumes_page))
        .route("/letters", get(pages::letters_page).post(pages::letters_submit))
        .route("/uploads/:filename", get(pages::download_resume))
        // API
        .route("/api/jobs", get(api::list_jobs).post(api::create_job))
        .route("/api/jobs/:job_id", delete(api::delete_job))
        .route("/api/upload", post(api::upload))
        .route("/api/results/:job_id", get(api::results))
        .route("/api/shortlisted", get(api::shortlisted))
        .route("/api/dashboard", get(api::dashboard))
        .route("/api/candidate/:candidate_id/email", put(api::update_email))
        .route("/api/send-emails", post(api::send_emails))
        .route("/api/test-email", post(api::test_email))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
