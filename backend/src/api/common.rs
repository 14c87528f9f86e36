//! Error handling utilities for API responses.
//!
//! Provides the standard response envelope and conversion between service-layer
//! errors and HTTP responses. Includes:
//! - Standard success/error response format
//! - ServiceError to HTTP status code mapping
//! - Validation error formatting helpers
//!
//! # Response Format
//! Every response carries `success` and an RFC 3339 `timestamp`. Failures
//! carry an `error` object:
//! - `code`: Machine-readable error category
//! - `message`: Human-readable message
//! - `details`: Optional field-specific validation errors

use crate::errors::ServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Response timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable description
    pub message: String,
    /// Field-specific validation errors when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-specific validation error details
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

/// Error half of every handler result: status plus a ready-to-send envelope.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a successful response with default message
    pub fn ok(data: T) -> Self {
        Self::success(data, "Request successful")
    }

    /// Create an error response
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Vec<FieldError>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: None,
            error: Some(ErrorDetails {
                code: code.into(),
                message: message.into(),
                details,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Builds an error tuple with the standard envelope
pub fn api_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> ApiError {
    (status, Json(ApiResponse::<()>::error(code, message, None)))
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    let (status, code, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
        }
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{} '{}' not found", entity, identifier),
        ),
        ServiceError::AlreadyExists { entity, identifier } => (
            StatusCode::CONFLICT,
            "ALREADY_EXISTS",
            format!("{} '{}' already exists", entity, identifier),
        ),
        ServiceError::Unauthenticated { message } => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Internal server error".to_string(),
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            )
        }
    };

    api_error(status, code, message)
}

/// Formats validator::ValidationErrors into field-specific error details
pub fn validation_errors_to_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect()
}

/// Helper to create validation error response
pub fn validation_error_response(errors: &validator::ValidationErrors) -> ApiError {
    let field_errors = validation_errors_to_field_errors(errors);
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            "VALIDATION_ERROR",
            "Validation failed",
            Some(field_errors),
        )),
    )
}
