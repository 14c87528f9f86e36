//! Database repository for user management operations.
//!
//! Provides the persistence operations for registered conference users.

use crate::database::models::{CreateUser, User};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str =
    "id, email, name, password_hash, role, participant_type, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - CreateUser DTO containing user details
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO users (id, email, name, password_hash, role, participant_type, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(user.email)
            .bind(user.name)
            .bind(user.password_hash)
            .bind(user.role.as_str())
            .bind(user.participant_type.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Checks if an email already exists in the system.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }
}
