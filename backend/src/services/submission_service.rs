//! Abstract submission business logic.
//!
//! Raw markdown from authors goes through abstract validation and
//! `process_for_storage` before anything is written. Only the sanitized
//! markdown and the artifacts derived from it are persisted.

use crate::auth::models::AuthenticatedIdentity;
use crate::content::{
    AbstractValidationReport, DEFAULT_PREVIEW_LENGTH, generate_preview, process_for_storage,
    validate_abstract,
};
use crate::database::models::{
    CreateSubmission, CreateSubmissionRequest, Submission, SubmissionDetail, SubmissionStatus,
    SubmissionSummary,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::submission_repository::SubmissionRepository;
use crate::repositories::user_repository::UserRepository;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Result of checking an abstract without submitting it.
#[derive(Debug, Clone, Serialize)]
pub struct AbstractCheck {
    pub report: AbstractValidationReport,
    pub preview: String,
    pub word_count: usize,
}

/// Validates `raw_markdown` and previews the sanitized text.
pub fn check_abstract(raw_markdown: &str) -> AbstractCheck {
    let report = validate_abstract(raw_markdown);
    let processed = process_for_storage(raw_markdown);

    AbstractCheck {
        report,
        preview: generate_preview(&processed.sanitized_markdown, DEFAULT_PREVIEW_LENGTH),
        word_count: processed.word_count,
    }
}

fn summarize(submission: Submission) -> SubmissionSummary {
    SubmissionSummary {
        preview: generate_preview(&submission.sanitized_markdown, DEFAULT_PREVIEW_LENGTH),
        id: submission.id,
        author_id: submission.author_id,
        title: submission.title,
        word_count: submission.word_count,
        status: submission.status,
        created_at: submission.created_at,
    }
}

pub struct SubmissionService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SubmissionService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Validates, sanitizes and stores a new abstract for `author`.
    ///
    /// # Errors
    /// - `Validation` when the payload or the abstract itself fails validation
    /// - `NotFound` when the author's account no longer exists
    pub async fn create_submission(
        &self,
        author: &AuthenticatedIdentity,
        request: CreateSubmissionRequest,
    ) -> ServiceResult<Submission> {
        if let Err(validation_errors) = request.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        let report = validate_abstract(&request.content);
        if !report.is_valid {
            return Err(ServiceError::validation(report.errors.join(" ")));
        }

        if UserRepository::new(self.pool)
            .get_user_by_id(&author.user_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("User", &author.user_id));
        }

        let content = process_for_storage(&request.content);
        let submission = SubmissionRepository::new(self.pool)
            .create_submission(CreateSubmission {
                id: Uuid::now_v7().to_string(),
                author_id: author.user_id.clone(),
                title: request.title.trim().to_string(),
                content,
            })
            .await?;

        tracing::info!(
            submission_id = %submission.id,
            author_id = %submission.author_id,
            word_count = submission.word_count,
            warnings = report.warnings.len(),
            "Submission created"
        );
        Ok(submission)
    }

    pub async fn list_submissions(&self) -> ServiceResult<Vec<SubmissionSummary>> {
        let submissions = SubmissionRepository::new(self.pool).list_submissions().await?;
        Ok(submissions.into_iter().map(summarize).collect())
    }

    pub async fn list_submissions_by_author(
        &self,
        author_id: &str,
    ) -> ServiceResult<Vec<SubmissionSummary>> {
        let submissions = SubmissionRepository::new(self.pool)
            .list_submissions_by_author(author_id)
            .await?;
        Ok(submissions.into_iter().map(summarize).collect())
    }

    pub async fn get_submission_required(&self, id: &str) -> ServiceResult<Submission> {
        SubmissionRepository::new(self.pool)
            .get_submission_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Submission", id))
    }

    /// Public view of a submission. The stored markdown is only exposed to
    /// its author and to admins/organizers.
    pub async fn get_submission_detail(
        &self,
        id: &str,
        viewer: Option<&AuthenticatedIdentity>,
    ) -> ServiceResult<SubmissionDetail> {
        let submission = self.get_submission_required(id).await?;
        let can_edit = viewer.is_some_and(|viewer| {
            viewer.role.is_elevated() || viewer.user_id == submission.author_id
        });

        Ok(SubmissionDetail {
            sanitized_markdown: can_edit.then_some(submission.sanitized_markdown),
            id: submission.id,
            author_id: submission.author_id,
            title: submission.title,
            abstract_html: submission.abstract_html,
            plain_text: submission.plain_text,
            word_count: submission.word_count,
            status: submission.status,
            created_at: submission.created_at,
            updated_at: submission.updated_at,
        })
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> ServiceResult<Submission> {
        let submission = SubmissionRepository::new(self.pool)
            .update_status(id, status)
            .await?
            .ok_or_else(|| ServiceError::not_found("Submission", id))?;

        tracing::info!(submission_id = %id, status = %status, "Submission status updated");
        Ok(submission)
    }

    pub async fn delete_submission(&self, id: &str) -> ServiceResult<()> {
        if !SubmissionRepository::new(self.pool)
            .delete_submission(id)
            .await?
        {
            return Err(ServiceError::not_found("Submission", id));
        }

        tracing::info!(submission_id = %id, "Submission deleted");
        Ok(())
    }
}
