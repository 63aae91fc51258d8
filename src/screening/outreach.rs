use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::info;

use crate::db;
use crate::error::AppError;
use crate::mail::{send_bulk, send_one, RecipientStatus, SendStatus, ShortlistEmail};
use crate::state::AppState;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

pub async fn update_email(
    state: &AppState,
    candidate_id: i64,
    email: Option<&str>,
) -> Result<String, AppError> {
    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("Email is required"))?;
    if !is_valid_email(email) {
        return Err(AppError::validation("Invalid email format"));
    }

    if !db::update_candidate_email(&state.pool, candidate_id, email).await? {
        return Err(AppError::not_found("Candidate not found"));
    }
    info!("Updated email for candidate {}", candidate_id);
    Ok(email.to_string())
}

#[derive(Debug, Serialize)]
pub struct BulkSendReport {
    pub message: String,
    pub sent_count: usize,
    pub total_count: usize,
    pub results: Vec<RecipientStatus>,
}

/// All-or-nothing with respect to missing addresses: if any selected
/// candidate has no email, nobody is contacted.
pub async fn send_emails(
    state: &AppState,
    candidate_ids: &[i64],
) -> Result<BulkSendReport, AppError> {
    if candidate_ids.is_empty() {
        return Err(AppError::validation("No candidates selected"));
    }

    let mut emails = Vec::new();
    let mut missing = Vec::new();
    for id in candidate_ids {
        let Some(contact) = db::get_candidate_contact(&state.pool, *id).await? else {
            continue;
        };
        match contact.email.filter(|e| !e.trim().is_empty()) {
            Some(recipient) => emails.push(ShortlistEmail {
                recipient,
                candidate_name: contact.name,
                job_title: contact.job_title,
                company: contact.company,
            }),
            None => missing.push(contact.name),
        }
    }

    if !missing.is_empty() {
        return Err(AppError::validation(format!(
            "Missing email addresses for candidates: {}",
            missing.join(", ")
        )));
    }
    if emails.is_empty() {
        return Err(AppError::validation("No valid candidates found"));
    }

    let results = send_bulk(state.mailer.as_ref(), &emails).await;
    let sent_count = results.iter().filter(|r| r.status.success).count();
    let total_count = results.len();

    Ok(BulkSendReport {
        message: format!(
            "Sent {} out of {} emails successfully",
            sent_count, total_count
        ),
        sent_count,
        total_count,
        results,
    })
}

pub async fn send_test_email(state: &AppState, address: Option<&str>) -> Result<SendStatus, AppError> {
    let address = address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::validation("Email address is required"))?;

    if !state.mailer.is_configured() {
        return Err(AppError::Config(
            "Email service not configured. Set MAIL_SERVER, MAIL_USERNAME and MAIL_PASSWORD."
                .to_string(),
        ));
    }

    let email = ShortlistEmail {
        recipient: address.to_string(),
        candidate_name: "Test Student".to_string(),
        job_title: "Test Position".to_string(),
        company: "Test Company".to_string(),
    };
    Ok(send_one(state.mailer.as_ref(), &email).await)
}
