//! JWT token utilities for authentication and authorization.
//!
//! Provides token issuing, verification into an [`AuthenticatedIdentity`]
//! and bearer-token extraction from the `Authorization` header.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::auth::models::{AuthenticatedIdentity, ParticipantType, UserRole};
use crate::config::Config;
use crate::errors::{ServiceError, TokenError};

/// JWT Claims structure containing the caller's identity
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub participant_type: ParticipantType,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

impl From<Claims> for AuthenticatedIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            participant_type: claims.participant_type,
        }
    }
}

/// Verifies a bearer token and yields the identity it carries.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, TokenError>;
}

/// JWT token utility for creating and validating tokens
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in_seconds: u64,
}

impl JwtUtils {
    pub fn new(secret: &str, expires_in_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtUtils {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expires_in_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expires_in_seconds)
    }

    pub fn expires_in_seconds(&self) -> u64 {
        self.expires_in_seconds
    }

    /// Generate a new access token for `identity`
    pub fn generate_token(&self, identity: &AuthenticatedIdentity) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in_seconds as i64);

        let claims = Claims {
            sub: identity.user_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            participant_type: identity.participant_type,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal_error(format!("Token generation failed: {}", e)))
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}

impl TokenVerifier for JwtUtils {
    fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, TokenError> {
        self.validate_token(token).map(AuthenticatedIdentity::from)
    }
}

/// Returns the token of a `Bearer <token>` header value, if any.
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
