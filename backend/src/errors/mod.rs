//! Global application error types and handlers.
//!
//! This module defines the error types shared across the backend: service
//! errors raised by business logic, the denial reasons produced by the
//! authorization guards, token verification failures and content pipeline
//! failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::common::ApiResponse;

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// True when a repository error was raised by a UNIQUE or primary key constraint.
pub fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}

/// Reason a guard refused to let a request through.
///
/// Every variant is terminal for the request: the guard writes the denial
/// envelope and the handler is never invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential, or a guard that needs an identity found none.
    #[error("{0}")]
    Unauthorized(String),
    /// A credential was presented but could not be verified.
    #[error("Invalid or expired token")]
    InvalidToken,
    /// The identity is verified but lacks the required privilege.
    #[error("{0}")]
    Forbidden(String),
    /// The client exceeded the configured request ceiling.
    #[error("Too many authentication attempts. Please try again later.")]
    TooManyRequests,
}

impl AuthError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Machine-readable reason code carried in the denial envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::TooManyRequests => "TOO_MANY_REQUESTS",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized(_) | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.code(), self.to_string(), None);
        (self.status(), Json(body)).into_response()
    }
}

/// Outcome of looking for and verifying a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Access token is required")]
    Missing,
    #[error("Token validation failed: {0}")]
    Invalid(String),
}

/// Failures inside the content pipeline. These are always recovered from
/// by falling back to a simpler strategy and never reach the caller.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Markdown rendering failed: {0}")]
    Render(String),
    #[error("Plain text extraction failed: {0}")]
    Extraction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status_mapping() {
        assert_eq!(
            AuthError::unauthorized("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::TooManyRequests.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_auth_error_codes() {
        assert_eq!(AuthError::unauthorized("x").code(), "UNAUTHORIZED");
        assert_eq!(AuthError::InvalidToken.code(), "INVALID_TOKEN");
        assert_eq!(AuthError::forbidden("x").code(), "FORBIDDEN");
        assert_eq!(AuthError::TooManyRequests.code(), "TOO_MANY_REQUESTS");
        assert_eq!(
            AuthError::TooManyRequests.to_string(),
            "Too many authentication attempts. Please try again later."
        );
    }
}
