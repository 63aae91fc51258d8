use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

#[derive(Clone, Debug)]
pub struct MailSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub sender_name: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub claude_api_key: String,
    pub claude_model: String,
    pub upload_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// `None` when the SMTP credentials are incomplete.
    pub mail: Option<MailSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://resumematch.db".to_string());

        let claude_api_key = std::env::var("CLAUDE_API_KEY")
            .map_err(|_| "CLAUDE_API_KEY must be set")?;
        let claude_model =
            std::env::var("CLAUDE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let upload_folder = base_dir.join(
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()),
        );

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse()
            .unwrap_or(5001);

        let max_upload_mb: usize = std::env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(32);

        Ok(Self {
            database_url,
            claude_api_key,
            claude_model,
            upload_folder,
            host,
            port,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            mail: mail_from_env(),
        })
    }
}

fn mail_from_env() -> Option<MailSettings> {
    let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    let server = non_empty("MAIL_SERVER")?;
    let username = non_empty("MAIL_USERNAME")?;
    let password = non_empty("MAIL_PASSWORD")?;
    let port = non_empty("MAIL_PORT")
        .and_then(|p| p.parse().ok())
        .unwrap_or(587);
    let sender = non_empty("MAIL_DEFAULT_SENDER").unwrap_or_else(|| username.clone());
    let sender_name =
        non_empty("MAIL_SENDER_NAME").unwrap_or_else(|| "ResumeMatch Recruiting".to_string());

    Some(MailSettings {
        server,
        port,
        username,
        password,
        sender,
        sender_name,
    })
}
