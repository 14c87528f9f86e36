//! User business logic service.
//!
//! Handles registration and credential checks for conference users.

use crate::auth::models::{ParticipantType, RegisterRequest, UserRole};
use crate::database::models::{CreateUser, User};
use crate::errors::{ServiceError, ServiceResult, is_unique_violation};
use crate::repositories::user_repository::UserRepository;
use bcrypt::{DEFAULT_COST, hash, verify};
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    hash_cost: u32,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            hash_cost: DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt cost factor.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Registers a new user account.
    ///
    /// Self-registration never grants organizer, reviewer or admin rights;
    /// those roles are assigned out of band.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Participant types that cannot be self-assigned
    /// - Duplicate email addresses
    /// - Password hashing failures
    pub async fn register_user(&self, request: RegisterRequest) -> ServiceResult<User> {
        let participant_type = request.participant_type.unwrap_or(ParticipantType::Attendee);
        let role = Self::role_for_registration(participant_type)?;

        let repo = UserRepository::new(self.pool);
        let email = request.email.trim().to_lowercase();

        if repo.email_exists(&email).await? {
            return Err(ServiceError::already_exists("User", &email));
        }

        let password_hash = self.hash_password(&request.password)?;

        let user = repo
            .create_user(CreateUser {
                id: Uuid::now_v7().to_string(),
                email: email.clone(),
                name: request.name.trim().to_string(),
                password_hash,
                role,
                participant_type,
            })
            .await
            .map_err(|e| Self::map_create_error(e, &email))?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered new user");
        Ok(user)
    }

    /// Checks an email/password pair and returns the matching user.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn authenticate_user(&self, email: &str, password: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let email = email.trim().to_lowercase();

        let Some(user) = repo.get_user_by_email(&email).await? else {
            return Err(ServiceError::unauthenticated("Invalid email or password"));
        };

        if !Self::verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(ServiceError::unauthenticated("Invalid email or password"));
        }

        Ok(user)
    }

    // A concurrent registration can insert the same email after `email_exists`.
    fn map_create_error(error: anyhow::Error, email: &str) -> ServiceError {
        if is_unique_violation(&error) {
            ServiceError::already_exists("User", email)
        } else {
            ServiceError::from(error)
        }
    }

    fn role_for_registration(participant_type: ParticipantType) -> ServiceResult<UserRole> {
        match participant_type {
            ParticipantType::KeynoteSpeaker
            | ParticipantType::Presenter
            | ParticipantType::PosterPresenter => Ok(UserRole::Presenter),
            ParticipantType::Organizer | ParticipantType::Reviewer => {
                Err(ServiceError::validation(format!(
                    "Participant type '{}' cannot be self-assigned",
                    participant_type
                )))
            }
            _ => Ok(UserRole::Participant),
        }
    }

    fn hash_password(&self, password: &str) -> ServiceResult<String> {
        hash(password, self.hash_cost)
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
    }

    fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
        verify(password, hash).map_err(|e| {
            ServiceError::internal_error(format!("Password verification failed: {}", e))
        })
    }
}
