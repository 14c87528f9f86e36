//! Database repository for abstract submissions.
//!
//! Stores the sanitized markdown together with the HTML, plain text and word
//! count derived from it, so that reads never re-run the content pipeline.

use crate::database::models::{CreateSubmission, Submission, SubmissionStatus};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const SUBMISSION_COLUMNS: &str = "id, author_id, title, sanitized_markdown, abstract_html, \
     plain_text, word_count, status, created_at, updated_at";

pub struct SubmissionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubmissionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a new submission in the `submitted` state.
    pub async fn create_submission(&self, submission: CreateSubmission) -> Result<Submission> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO submissions (id, author_id, title, sanitized_markdown, abstract_html, plain_text, word_count, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            SUBMISSION_COLUMNS
        );

        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(submission.id)
            .bind(submission.author_id)
            .bind(submission.title)
            .bind(submission.content.sanitized_markdown)
            .bind(submission.content.html)
            .bind(submission.content.plain_text)
            .bind(submission.content.word_count as i64)
            .bind(SubmissionStatus::Submitted.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(submission)
    }

    pub async fn get_submission_by_id(&self, id: &str) -> Result<Option<Submission>> {
        let query = format!("SELECT {} FROM submissions WHERE id = ?", SUBMISSION_COLUMNS);
        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(submission)
    }

    /// All submissions, newest first.
    pub async fn list_submissions(&self) -> Result<Vec<Submission>> {
        let query = format!(
            "SELECT {} FROM submissions ORDER BY created_at DESC, id DESC",
            SUBMISSION_COLUMNS
        );
        let submissions = sqlx::query_as::<_, Submission>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(submissions)
    }

    pub async fn list_submissions_by_author(&self, author_id: &str) -> Result<Vec<Submission>> {
        let query = format!(
            "SELECT {} FROM submissions WHERE author_id = ? ORDER BY created_at DESC, id DESC",
            SUBMISSION_COLUMNS
        );
        let submissions = sqlx::query_as::<_, Submission>(&query)
            .bind(author_id)
            .fetch_all(self.pool)
            .await?;

        Ok(submissions)
    }

    /// Returns the updated row, or `None` when no submission has this ID.
    pub async fn update_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<Option<Submission>> {
        let query = format!(
            "UPDATE submissions SET status = ?, updated_at = ? WHERE id = ? RETURNING {}",
            SUBMISSION_COLUMNS
        );
        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(submission)
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete_submission(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
