// Stub collaborators and state shared by unit and integration tests.
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::agents::{AgentError, Analyzer, CandidateAnalysis};
use crate::config::Config;
use crate::db;
use crate::extract::{DocumentKind, DocumentReader, ExtractError};
use crate::mail::{MailError, Mailer, ShortlistEmail};
use crate::state::AppState;

/// Scores every resume with `score`; resumes mentioning "QUOTA" fail.
pub struct StubAnalyzer {
    pub score: i64,
    pub title: Result<String, u16>,
    pub calls: AtomicUsize,
}

impl StubAnalyzer {
    pub fn new(score: i64) -> Self {
        Self {
            score,
            title: Ok("Platform Engineer".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_title(mut self, title: Result<String, u16>) -> Self {
        self.title = title;
        self
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(
        &self,
        _job_description: &str,
        resume_text: &str,
    ) -> Result<CandidateAnalysis, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if resume_text.contains("QUOTA") {
            return Err(AgentError::Api {
                status: 429,
                message: "quota exceeded".into(),
            });
        }
        Ok(CandidateAnalysis {
            relevance_score: self.score,
            fit_verdict: "Good Fit".into(),
            summary: "Solid background.".into(),
            personalized_feedback: "Add metrics.".into(),
            missing_skills: vec!["Go".into()],
        })
    }

    async fn extract_job_title(&self, _description: &str) -> Result<String, AgentError> {
        self.title.clone().map_err(|status| AgentError::Api {
            status,
            message: "title extraction failed".into(),
        })
    }
}

/// Serves canned text keyed by file name; unknown files are unreadable.
#[derive(Default)]
pub struct StubReader {
    pub texts: HashMap<String, String>,
}

impl StubReader {
    pub fn with(mut self, file_name: &str, text: &str) -> Self {
        self.texts.insert(file_name.to_string(), text.to_string());
        self
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        pairs
            .iter()
            .fold(Self::default(), |reader, (name, text)| reader.with(name, text))
    }
}

impl DocumentReader for StubReader {
    fn read(&self, path: &Path, _kind: DocumentKind) -> Result<String, ExtractError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.texts.get(name).cloned().ok_or_else(|| {
            ExtractError::Pdf(format!("no text for {name}"))
        })
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub configured: bool,
    pub sent: Mutex<Vec<ShortlistEmail>>,
}

impl RecordingMailer {
    pub fn configured() -> Self {
        Self::new(true)
    }

    pub fn new(configured: bool) -> Self {
        Self {
            configured,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.recipient.clone())
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, email: &ShortlistEmail) -> Result<(), MailError> {
        if !self.configured {
            return Err(MailError::NotConfigured);
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn test_config(upload_folder: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        claude_api_key: "test-key".into(),
        claude_model: crate::config::DEFAULT_MODEL.into(),
        upload_folder,
        host: "127.0.0.1".into(),
        port: 0,
        max_upload_bytes: 1024 * 1024,
        mail: None,
    }
}

pub async fn test_state_with(
    analyzer: Arc<dyn Analyzer>,
    mailer: Arc<dyn Mailer>,
    reader: Arc<dyn DocumentReader>,
) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::create_memory_pool().await.unwrap();
    let state = AppState {
        pool,
        config: Arc::new(test_config(dir.path().to_path_buf())),
        analyzer,
        mailer,
        reader,
    };
    (state, dir)
}

pub async fn test_state() -> (AppState, tempfile::TempDir) {
    test_state_with(
        Arc::new(StubAnalyzer::new(70)),
        Arc::new(RecordingMailer::configured()),
        Arc::new(StubReader::default()),
    )
    .await
}
