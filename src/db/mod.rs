mod models;

pub use models::*;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::screening::SHORTLIST_THRESHOLD;

pub type DbPool = Arc<SqlitePool>;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(Arc::new(pool))
}

/// Single-connection in-memory database; the connection is never recycled
/// so the schema lives as long as the pool.
pub async fn create_memory_pool() -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

// ---- jobs ----

pub async fn create_job(
    pool: &SqlitePool,
    title: &str,
    company: &str,
    description: &str,
) -> Result<Job, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO jobs (title, company, description, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(title)
    .bind(company)
    .bind(description)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_job(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get_job(pool: &SqlitePool, job_id: i64) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_jobs(pool: &SqlitePool) -> Result<Vec<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY id DESC")
        .fetch_all(pool)
        .await
}

pub async fn count_jobs(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await
}

/// Removes a job together with its candidates and their analyses.
/// Returns `false` when the job did not exist.
pub async fn delete_job(pool: &SqlitePool, job_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM analysis_results
        WHERE candidate_id IN (SELECT id FROM candidates WHERE job_id = ?)
        "#,
    )
    .bind(job_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM candidates WHERE job_id = ?")
        .bind(job_id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM jobs WHERE id = ?")
        .bind(job_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(deleted > 0)
}

// ---- candidates ----

pub async fn create_candidate(
    pool: &SqlitePool,
    name: &str,
    resume_filename: &str,
    job_id: i64,
) -> Result<Candidate, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO candidates (name, resume_filename, job_id, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(resume_filename)
    .bind(job_id)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_candidate(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get_candidate(
    pool: &SqlitePool,
    candidate_id: i64,
) -> Result<Option<Candidate>, sqlx::Error> {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}

pub async fn count_candidates(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
        .fetch_one(pool)
        .await
}

pub async fn update_candidate_email(
    pool: &SqlitePool,
    candidate_id: i64,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query("UPDATE candidates SET email = ? WHERE id = ?")
        .bind(email)
        .bind(candidate_id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(updated > 0)
}

pub async fn get_candidate_contact(
    pool: &SqlitePool,
    candidate_id: i64,
) -> Result<Option<CandidateContact>, sqlx::Error> {
    sqlx::query_as::<_, CandidateContact>(
        r#"
        SELECT c.id, c.name, c.email, j.title AS job_title, j.company
        FROM candidates c
        JOIN jobs j ON c.job_id = j.id
        WHERE c.id = ?
        "#,
    )
    .bind(candidate_id)
    .fetch_optional(pool)
    .await
}

/// Candidates of one job, most recent first, each with its analysis if any.
pub async fn get_job_candidates(
    pool: &SqlitePool,
    job_id: i64,
) -> Result<Vec<CandidateWithAnalysis>, sqlx::Error> {
    let candidates = sqlx::query_as::<_, Candidate>(
        "SELECT * FROM candidates WHERE job_id = ? ORDER BY id DESC",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    let analyses = sqlx::query_as::<_, AnalysisResult>(
        r#"
        SELECT a.* FROM analysis_results a
        JOIN candidates c ON a.candidate_id = c.id
        WHERE c.job_id = ?
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    let mut by_candidate: HashMap<i64, AnalysisResult> = analyses
        .into_iter()
        .map(|a| (a.candidate_id, a))
        .collect();

    Ok(candidates
        .into_iter()
        .map(|candidate| {
            let analysis = by_candidate.remove(&candidate.id);
            CandidateWithAnalysis { candidate, analysis }
        })
        .collect())
}

// ---- analysis ----

pub async fn create_analysis(
    pool: &SqlitePool,
    candidate_id: i64,
    analysis: &NewAnalysis,
) -> Result<i64, sqlx::Error> {
    let missing_skills =
        serde_json::to_string(&analysis.missing_skills).unwrap_or_else(|_| "[]".to_string());

    let id = sqlx::query(
        r#"
        INSERT INTO analysis_results (score, verdict, summary, feedback, missing_skills, candidate_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(analysis.score)
    .bind(&analysis.verdict)
    .bind(&analysis.summary)
    .bind(&analysis.feedback)
    .bind(missing_skills)
    .bind(candidate_id)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn get_shortlisted(pool: &SqlitePool) -> Result<Vec<ShortlistEntry>, sqlx::Error> {
    sqlx::query_as::<_, ShortlistEntry>(
        r#"
        SELECT c.id, c.name, COALESCE(c.email, '') AS email, c.resume_filename,
               j.title AS job_title, j.company, j.id AS job_id,
               a.score, a.verdict, a.summary
        FROM candidates c
        JOIN analysis_results a ON a.candidate_id = c.id
        JOIN jobs j ON c.job_id = j.id
        WHERE a.score >= ?
        ORDER BY a.score DESC, c.id DESC
        "#,
    )
    .bind(SHORTLIST_THRESHOLD)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(score: i64) -> NewAnalysis {
        NewAnalysis {
            score,
            verdict: "Fit".to_string(),
            summary: "summary".to_string(),
            feedback: "feedback".to_string(),
            missing_skills: vec!["Kubernetes".to_string()],
        }
    }

    async fn row_count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn delete_job_cascades_to_candidates_and_analyses() {
        let pool = create_memory_pool().await.unwrap();
        let doomed = create_job(&pool, "Backend", "Acme", "Rust").await.unwrap();
        let kept = create_job(&pool, "Frontend", "Acme", "TS").await.unwrap();

        let a = create_candidate(&pool, "Ann", "ann.pdf", doomed.id).await.unwrap();
        create_candidate(&pool, "Bob", "bob.pdf", doomed.id).await.unwrap();
        let c = create_candidate(&pool, "Cyd", "cyd.pdf", kept.id).await.unwrap();
        create_analysis(&pool, a.id, &analysis(80)).await.unwrap();
        create_analysis(&pool, c.id, &analysis(50)).await.unwrap();

        assert!(delete_job(&pool, doomed.id).await.unwrap());

        assert_eq!(row_count(&pool, "jobs").await, 1);
        assert_eq!(row_count(&pool, "candidates").await, 1);
        assert_eq!(row_count(&pool, "analysis_results").await, 1);
        let orphans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM candidates WHERE job_id NOT IN (SELECT id FROM jobs)",
        )
        .fetch_one(pool.as_ref())
        .await
        .unwrap();
        assert_eq!(orphans, 0);

        assert!(!delete_job(&pool, doomed.id).await.unwrap());
    }

    #[tokio::test]
    async fn analysis_is_unique_per_candidate() {
        let pool = create_memory_pool().await.unwrap();
        let job = create_job(&pool, "Backend", "Acme", "Rust").await.unwrap();
        let cand = create_candidate(&pool, "Ann", "ann.pdf", job.id).await.unwrap();

        create_analysis(&pool, cand.id, &analysis(70)).await.unwrap();
        assert!(create_analysis(&pool, cand.id, &analysis(90)).await.is_err());
    }

    #[tokio::test]
    async fn candidate_requires_existing_job() {
        let pool = create_memory_pool().await.unwrap();
        assert!(create_candidate(&pool, "Ghost", "ghost.pdf", 404).await.is_err());
    }

    #[tokio::test]
    async fn shortlist_uses_inner_join_and_threshold() {
        let pool = create_memory_pool().await.unwrap();
        let job = create_job(&pool, "Backend", "Acme", "Rust").await.unwrap();

        let low = create_candidate(&pool, "Low", "low.pdf", job.id).await.unwrap();
        let edge = create_candidate(&pool, "Edge", "edge.pdf", job.id).await.unwrap();
        let top = create_candidate(&pool, "Top", "top.pdf", job.id).await.unwrap();
        create_candidate(&pool, "Pending", "pending.pdf", job.id).await.unwrap();

        create_analysis(&pool, low.id, &analysis(64)).await.unwrap();
        create_analysis(&pool, edge.id, &analysis(65)).await.unwrap();
        create_analysis(&pool, top.id, &analysis(92)).await.unwrap();

        let shortlisted = get_shortlisted(&pool).await.unwrap();
        let names: Vec<&str> = shortlisted.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Top", "Edge"]);
        assert_eq!(shortlisted[0].job_title, "Backend");
        assert_eq!(shortlisted[0].email, "");
    }

    #[tokio::test]
    async fn job_candidates_nest_analysis_most_recent_first() {
        let pool = create_memory_pool().await.unwrap();
        let job = create_job(&pool, "Backend", "Acme", "Rust").await.unwrap();
        let first = create_candidate(&pool, "First", "first.pdf", job.id).await.unwrap();
        create_candidate(&pool, "Second", "second.pdf", job.id).await.unwrap();
        create_analysis(&pool, first.id, &analysis(77)).await.unwrap();

        let rows = get_job_candidates(&pool, job.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].candidate.name, "Second");
        assert!(rows[0].analysis.is_none());
        let nested = rows[1].analysis.as_ref().unwrap();
        assert_eq!(nested.score, 77);
        assert_eq!(nested.missing_skills_list(), vec!["Kubernetes".to_string()]);
    }
}
