//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for registration, login
//! and identity lookup, validate input, and hand off to `auth::service`.

use crate::api::common::{ApiError, ApiResponse, service_error_to_http, validation_error_response};
use crate::auth::middleware::CurrentIdentity;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::utils::jwt::JwtUtils;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

/// Handle account registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ApiResponse<TokenResponse>), ApiError> {
    if let Err(errors) = payload.validate() {
        return Err(validation_error_response(&errors));
    }

    let response = AuthService::new(&pool, &jwt_utils)
        .register(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(response, "Registration successful"),
    ))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    if let Err(errors) = payload.validate() {
        return Err(validation_error_response(&errors));
    }

    let response = AuthService::new(&pool, &jwt_utils)
        .login(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok(ApiResponse::success(response, "Login successful"))
}

/// Get current user information from token
pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> ApiResponse<AuthenticatedIdentity> {
    ApiResponse::ok(identity)
}
