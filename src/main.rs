use resume_match::agents::ClaudeAgent;
use resume_match::config::Config;
use resume_match::extract::FileReader;
use resume_match::mail::SmtpMailer;
use resume_match::state::AppState;
use resume_match::{build_router, db, storage};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_match=info,tower_http=info".into()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    storage::ensure_dirs(&config.upload_folder)?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let analyzer = ClaudeAgent::new(config.claude_api_key.clone(), config.claude_model.clone())?;
    tracing::info!("Analysis client ready (model: {})", analyzer.model());
    let mailer = SmtpMailer::new(config.mail.as_ref())?;

    let state = AppState {
        pool,
        config: config.clone(),
        analyzer: Arc::new(analyzer),
        mailer: Arc::new(mailer),
        reader: Arc::new(FileReader),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("ResumeMatch listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
