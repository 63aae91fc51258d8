use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::{self, Job, NewAnalysis};
use crate::error::AppError;
use crate::extract::DocumentKind;
use crate::state::AppState;
use crate::storage::{candidate_name_from_filename, save_upload, UploadedFile};

#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub message: String,
    pub processed_count: usize,
    pub total_files: usize,
    pub success: bool,
}

enum FileOutcome {
    Processed,
    Skipped,
}

/// Runs every resume in the batch through save → extract → candidate →
/// analysis, one file at a time. A failing file is logged and skipped; the
/// rest of the batch still runs.
pub async fn upload_resumes(
    state: &AppState,
    job_id: i64,
    files: Vec<UploadedFile>,
) -> Result<UploadSummary, AppError> {
    let job = db::get_job(&state.pool, job_id)
        .await?
        .ok_or_else(|| AppError::not_found("Job not found"))?;

    let files: Vec<UploadedFile> = files
        .into_iter()
        .filter(|f| !f.filename.is_empty())
        .collect();
    let total_files = files.len();
    let mut processed_count = 0;

    for (index, file) in files.iter().enumerate() {
        info!(
            "Processing resume {}/{}: {}",
            index + 1,
            total_files,
            file.filename
        );
        match process_resume(state, &job, file).await {
            Ok(FileOutcome::Processed) => processed_count += 1,
            Ok(FileOutcome::Skipped) => {}
            Err(e) => {
                error!("Error processing candidate {}: {}", file.filename, e);
                continue;
            }
        }
    }

    Ok(UploadSummary {
        message: format!(
            "Resumes uploaded and analysis completed. Processed {} out of {} files.",
            processed_count, total_files
        ),
        processed_count,
        total_files,
        success: true,
    })
}

async fn process_resume(
    state: &AppState,
    job: &Job,
    file: &UploadedFile,
) -> Result<FileOutcome, AppError> {
    let (filename, path) = save_upload(&state.config.upload_folder, &file.filename, &file.data)?;

    // resumes are read as PDF regardless of extension
    let resume_text = state.reader.text(&path, DocumentKind::Pdf);
    if resume_text.trim().is_empty() {
        warn!("Could not extract text from {}, skipping", filename);
        return Ok(FileOutcome::Skipped);
    }

    let name = candidate_name_from_filename(&filename);
    let candidate = db::create_candidate(&state.pool, &name, &filename, job.id).await?;
    info!("Created candidate record for: {}", name);

    match state.analyzer.analyze(&job.description, &resume_text).await {
        Ok(analysis) => {
            let row = NewAnalysis {
                score: analysis.relevance_score,
                verdict: analysis.fit_verdict,
                summary: analysis.summary,
                feedback: analysis.personalized_feedback,
                missing_skills: analysis.missing_skills,
            };
            db::create_analysis(&state.pool, candidate.id, &row).await?;
            info!(
                "Analysis completed for {}: score {}, verdict {}",
                name, row.score, row.verdict
            );
        }
        Err(e) => warn!("Analysis failed for {}: {}", name, e),
    }

    Ok(FileOutcome::Processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_state_with, RecordingMailer, StubAnalyzer, StubReader};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn resume(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            data: b"%PDF-1.4".to_vec(),
        }
    }

    #[tokio::test]
    async fn unreadable_resume_creates_no_candidate_and_batch_continues() {
        let reader = StubReader::default()
            .with("ann_lee.pdf", "Rust, Tokio, Postgres")
            .with("bob-stone.pdf", "Go, Kubernetes");
        let analyzer = Arc::new(StubAnalyzer::new(72));
        let (state, _dir) =
            test_state_with(analyzer.clone(), Arc::new(RecordingMailer::default()), Arc::new(reader))
                .await;
        let job = db::create_job(&state.pool, "Backend", "Acme", "Rust services").await.unwrap();

        let summary = upload_resumes(
            &state,
            job.id,
            vec![resume("ann_lee.pdf"), resume("corrupt.pdf"), resume("bob-stone.pdf")],
        )
        .await
        .unwrap();

        assert!(summary.success);
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.processed_count, 2);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);

        let rows = db::get_job_candidates(&state.pool, job.id).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.candidate.name.as_str()).collect();
        assert_eq!(names, vec!["Bob Stone", "Ann Lee"]);
        assert!(rows.iter().all(|r| r.analysis.as_ref().map(|a| a.score) == Some(72)));
    }

    #[tokio::test]
    async fn failed_analysis_keeps_candidate_without_result() {
        let reader = StubReader::default().with("cyd.pdf", "QUOTA trips the stub");
        let (state, _dir) = test_state_with(
            Arc::new(StubAnalyzer::new(90)),
            Arc::new(RecordingMailer::default()),
            Arc::new(reader),
        )
        .await;
        let job = db::create_job(&state.pool, "Backend", "Acme", "Rust").await.unwrap();

        let summary = upload_resumes(&state, job.id, vec![resume("cyd.pdf")]).await.unwrap();
        assert_eq!(summary.processed_count, 1);

        let rows = db::get_job_candidates(&state.pool, job.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].analysis.is_none());
        assert!(db::get_shortlisted(&state.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_job_and_blank_filenames() {
        let (state, _dir) = test_state_with(
            Arc::new(StubAnalyzer::new(90)),
            Arc::new(RecordingMailer::default()),
            Arc::new(StubReader::default()),
        )
        .await;

        assert!(matches!(
            upload_resumes(&state, 42, vec![resume("a.pdf")]).await,
            Err(AppError::NotFound(_))
        ));

        let job = db::create_job(&state.pool, "Backend", "Acme", "Rust").await.unwrap();
        let summary = upload_resumes(&state, job.id, vec![resume(""), resume("???")])
            .await
            .unwrap();
        assert_eq!(summary.total_files, 1);
        assert_eq!(summary.processed_count, 0);
    }
}
