//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::database::models::User;
use crate::errors::ServiceResult;
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use sqlx::SqlitePool;

/// Authentication service for handling login, registration and token issuing
pub struct AuthService<'a> {
    jwt_utils: &'a JwtUtils,
    user_service: UserService<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a SqlitePool, jwt_utils: &'a JwtUtils) -> Self {
        AuthService {
            jwt_utils,
            user_service: UserService::new(pool),
        }
    }

    #[cfg(test)]
    pub fn with_user_service(mut self, user_service: UserService<'a>) -> Self {
        self.user_service = user_service;
        self
    }

    /// Creates an account and signs the new user in.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<TokenResponse> {
        let user = self.user_service.register_user(request).await?;
        self.issue_token(&user)
    }

    /// Verifies credentials and issues an access token.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<TokenResponse> {
        let user = self
            .user_service
            .authenticate_user(&request.email, &request.password)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue_token(&user)
    }

    fn issue_token(&self, user: &User) -> ServiceResult<TokenResponse> {
        let identity = user.identity()?;
        let access_token = self.jwt_utils.generate_token(&identity)?;

        Ok(TokenResponse {
            access_token,
            expires_in: self.jwt_utils.expires_in_seconds(),
            user: identity,
        })
    }
}
