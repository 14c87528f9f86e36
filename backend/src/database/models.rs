//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database, together with the request and response shapes of the
//! submission endpoints. Enumerated columns are stored as their snake_case
//! text form and parsed on the way out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use validator::Validate;

use crate::auth::models::{AuthenticatedIdentity, ParticipantType, UserRole};
use crate::content::SanitizationResult;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub participant_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Identity carried in this user's access tokens.
    pub fn identity(&self) -> ServiceResult<AuthenticatedIdentity> {
        let role = UserRole::from_str(&self.role).map_err(ServiceError::internal_error)?;
        let participant_type = ParticipantType::from_str(&self.participant_type)
            .map_err(ServiceError::internal_error)?;

        Ok(AuthenticatedIdentity {
            user_id: self.id.clone(),
            email: self.email.clone(),
            role,
            participant_type,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub participant_type: ParticipantType,
}

/// Review lifecycle of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    UnderReview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::Withdrawn => "withdrawn",
        }
    }
}

impl Display for SubmissionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(SubmissionStatus::Submitted),
            "under_review" => Ok(SubmissionStatus::UnderReview),
            "accepted" => Ok(SubmissionStatus::Accepted),
            "rejected" => Ok(SubmissionStatus::Rejected),
            "withdrawn" => Ok(SubmissionStatus::Withdrawn),
            _ => Err(format!("Invalid submission status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub sanitized_markdown: String,
    pub abstract_html: String,
    pub plain_text: String,
    pub word_count: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: SanitizationResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    /// Raw markdown as typed by the author.
    #[validate(length(max = 20000, message = "Abstract must be at most 20000 characters"))]
    pub content: String,
}

// Titles are stored trimmed, so the bounds apply to the trimmed text.
fn validate_title(title: &str) -> Result<(), validator::ValidationError> {
    let length = title.trim().chars().count();
    if !(1..=300).contains(&length) {
        return Err(validator::ValidationError::new("title_length")
            .with_message("Title must be between 1-300 characters".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubmissionStatusRequest {
    pub status: SubmissionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateAbstractRequest {
    pub content: String,
}

/// Listing entry: metadata plus a plain-text preview of the abstract.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub preview: String,
    pub word_count: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Full view of one submission. The stored markdown is only included for
/// the author and elevated roles.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetail {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub abstract_html: String,
    pub plain_text: String,
    pub word_count: i64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized_markdown: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
