//! Handler functions for submission endpoints.
//!
//! Guards have already run by the time these are called; handlers only read
//! the identity they attached.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http};
use crate::auth::middleware::{CurrentIdentity, MaybeIdentity};
use crate::database::models::{
    CreateSubmissionRequest, Submission, SubmissionDetail, SubmissionSummary,
    UpdateSubmissionStatusRequest, ValidateAbstractRequest,
};
use crate::services::submission_service::{AbstractCheck, SubmissionService, check_abstract};
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;

/// Checks an abstract without storing it.
pub async fn validate_abstract(
    MaybeIdentity(identity): MaybeIdentity,
    Json(payload): Json<ValidateAbstractRequest>,
) -> ApiResponse<AbstractCheck> {
    if let Some(identity) = identity {
        tracing::debug!("Abstract check requested by {}", identity.user_id);
    }

    ApiResponse::ok(check_abstract(&payload.content))
}

#[axum::debug_handler]
pub async fn create_submission(
    Extension(pool): Extension<SqlitePool>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, ApiResponse<Submission>), ApiError> {
    tracing::info!("Creating submission for user: {}", identity.user_id);

    let submission = SubmissionService::new(&pool)
        .create_submission(&identity, payload)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to create submission for {}: {}", identity.user_id, e);
            service_error_to_http(e)
        })?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(submission, "Submission created successfully"),
    ))
}

pub async fn list_submissions(
    Extension(pool): Extension<SqlitePool>,
) -> Result<ApiResponse<Vec<SubmissionSummary>>, ApiError> {
    let submissions = SubmissionService::new(&pool)
        .list_submissions()
        .await
        .map_err(service_error_to_http)?;

    Ok(ApiResponse::ok(submissions))
}

pub async fn get_submission(
    Extension(pool): Extension<SqlitePool>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
) -> Result<ApiResponse<SubmissionDetail>, ApiError> {
    let detail = SubmissionService::new(&pool)
        .get_submission_detail(&id, identity.as_ref())
        .await
        .map_err(service_error_to_http)?;

    Ok(ApiResponse::ok(detail))
}

#[axum::debug_handler]
pub async fn update_submission_status(
    Extension(pool): Extension<SqlitePool>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSubmissionStatusRequest>,
) -> Result<ApiResponse<Submission>, ApiError> {
    tracing::info!(
        "User {} setting submission {} to {}",
        identity.user_id,
        id,
        payload.status
    );

    let submission = SubmissionService::new(&pool)
        .update_status(&id, payload.status)
        .await
        .map_err(service_error_to_http)?;

    Ok(ApiResponse::success(submission, "Submission status updated"))
}

pub async fn delete_submission(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    SubmissionService::new(&pool)
        .delete_submission(&id)
        .await
        .map_err(service_error_to_http)?;

    Ok(ApiResponse::success(json!({ "id": id }), "Submission deleted"))
}

/// Submissions authored by the user in the path.
pub async fn list_user_submissions(
    Extension(pool): Extension<SqlitePool>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Vec<SubmissionSummary>>, ApiError> {
    let submissions = SubmissionService::new(&pool)
        .list_submissions_by_author(&user_id)
        .await
        .map_err(service_error_to_http)?;

    Ok(ApiResponse::ok(submissions))
}
