#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use resume_match::state::AppState;
use resume_match::testing::{test_state_with, RecordingMailer, StubAnalyzer, StubReader};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    _dir: tempfile::TempDir,
}

/// Router over an in-memory database. Every resume scores 80 and AI title
/// extraction always fails, so jobs without a title get the numbered fallback.
pub async fn spawn_app(texts: &[(&str, &str)], mail_configured: bool) -> TestApp {
    let mailer = Arc::new(RecordingMailer::new(mail_configured));
    let (state, dir) = test_state_with(
        Arc::new(StubAnalyzer::new(80).with_title(Err(503))),
        mailer.clone(),
        Arc::new(StubReader::from_pairs(texts)),
    )
    .await;

    TestApp {
        router: resume_match::build_router(state.clone()),
        state,
        mailer,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "X-RESUME-MATCH-BOUNDARY";

/// Builds a multipart body from `(field, filename, content)` parts; a `None`
/// filename makes a plain text field.
pub fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    for (field, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
