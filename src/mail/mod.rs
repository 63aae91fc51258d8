use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

mod shortlist;

pub use shortlist::ShortlistEmail;

use crate::config::MailSettings;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Could not render message: {0}")]
    Template(#[from] tera::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendStatus {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipientStatus {
    pub name: String,
    pub email: String,
    pub status: SendStatus,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn send(&self, email: &ShortlistEmail) -> Result<(), MailError>;
}

/// Sends one message and folds the outcome into a status.
pub async fn send_one(mailer: &dyn Mailer, email: &ShortlistEmail) -> SendStatus {
    match mailer.send(email).await {
        Ok(()) => {
            info!("Shortlist email sent to {}", email.recipient);
            SendStatus {
                success: true,
                message: format!("Email sent successfully to {}", email.recipient),
            }
        }
        Err(e) => {
            warn!("Could not send email to {}: {}", email.recipient, e);
            SendStatus {
                success: false,
                message: format!("Failed to send email: {}", e),
            }
        }
    }
}

/// Sends every message independently; one failure does not stop the rest.
pub async fn send_bulk(mailer: &dyn Mailer, emails: &[ShortlistEmail]) -> Vec<RecipientStatus> {
    let mut results = Vec::with_capacity(emails.len());
    for email in emails {
        let status = send_one(mailer, email).await;
        results.push(RecipientStatus {
            name: email.candidate_name.clone(),
            email: email.recipient.clone(),
            status,
        });
    }
    results
}

/// SMTP mailer; without settings every send fails with `NotConfigured`.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn new(settings: Option<&MailSettings>) -> Result<Self, MailError> {
        let Some(settings) = settings else {
            info!("Mail settings incomplete, outbound email disabled");
            return Ok(Self::disabled());
        };

        let creds = Credentials::new(settings.username.clone(), settings.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)?
            .port(settings.port)
            .credentials(creds)
            .build();
        let from = Mailbox::new(
            Some(settings.sender_name.clone()),
            settings.sender.parse::<Address>()?,
        );

        info!("Mail configured via {}:{}", settings.server, settings.port);
        Ok(Self {
            transport: Some(transport),
            from: Some(from),
        })
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    async fn send(&self, email: &ShortlistEmail) -> Result<(), MailError> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            return Err(MailError::NotConfigured);
        };

        debug!("sending email to {}", &email.recipient);
        let to = Mailbox::new(
            Some(email.candidate_name.clone()),
            email.recipient.parse::<Address>()?,
        );
        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(email.subject())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body()?)?;

        transport.send(message).await?;
        Ok(())
    }
}
