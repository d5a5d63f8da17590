//! User service - Handles user-related business logic.
//!
//! The sole home of business validation: non-empty usernames and
//! username uniqueness are enforced here, before any persistence call.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a new user; the store assigns the id
    async fn create_user(&self, username: String, password: String) -> AppResult<User>;

    /// List every stored user in insertion order
    async fn get_all_users(&self) -> AppResult<Vec<User>>;

    /// Get user by id
    async fn get_user_by_id(&self, id: i64) -> AppResult<User>;

    /// Overwrite username and password on an existing user
    async fn update_user(&self, id: i64, username: String, password: String) -> AppResult<User>;

    /// Remove a user permanently
    async fn delete_user_by_id(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(format!("User not found with id: {}", id))
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, username: String, password: String) -> AppResult<User> {
        // Emptiness check runs before the uniqueness check
        if username.is_empty() {
            return Err(AppError::validation("Username cannot be empty"));
        }
        if self.repo.exists_by_username(&username).await? {
            return Err(AppError::validation("Username already exists"));
        }

        self.repo.create(username, password).await
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        self.repo.find_all().await
    }

    async fn get_user_by_id(&self, id: i64) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    async fn update_user(&self, id: i64, username: String, password: String) -> AppResult<User> {
        if username.is_empty() {
            return Err(AppError::validation("Username cannot be empty"));
        }

        let mut user = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;

        // A user keeping its own username is not a conflict; the same
        // username on a different id is, even mid-update.
        if self.repo.exists_by_username_excluding(&username, id).await? {
            return Err(AppError::validation("Username already exists"));
        }

        user.username = username;
        user.password = password;
        self.repo.update(user).await
    }

    async fn delete_user_by_id(&self, id: i64) -> AppResult<()> {
        if !self.repo.exists_by_id(id).await? {
            return Err(not_found(id));
        }
        self.repo.delete_by_id(id).await
    }
}
