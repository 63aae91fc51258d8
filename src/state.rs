use crate::agents::Analyzer;
use crate::config::Config;
use crate::db::DbPool;
use crate::extract::DocumentReader;
use crate::mail::Mailer;
use std::sync::Arc;

/// Everything a request handler needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub analyzer: Arc<dyn Analyzer>,
    pub mailer: Arc<dyn Mailer>,
    pub reader: Arc<dyn DocumentReader>,
}
