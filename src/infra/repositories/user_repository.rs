//! User repository implementation.
//!
//! Thin persistence layer over SeaORM; all business validation lives
//! in the service above it.

use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether any user owns this username
    async fn exists_by_username(&self, username: &str) -> AppResult<bool>;

    /// Whether a user other than `id` owns this username
    async fn exists_by_username_excluding(&self, username: &str, id: i64) -> AppResult<bool>;

    /// Find user by id
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// All users in insertion (id) order
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Insert a new user; the database assigns the id
    async fn create(&self, username: String, password: String) -> AppResult<User>;

    /// Overwrite an existing user's row by its id
    async fn update(&self, user: User) -> AppResult<User>;

    /// Whether a user with this id exists
    async fn exists_by_id(&self, id: i64) -> AppResult<bool>;

    /// Remove a user's row
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn exists_by_username_excluding(&self, username: &str, id: i64) -> AppResult<bool> {
        let count = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::Id.ne(id))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn create(&self, username: String, password: String) -> AppResult<User> {
        let active_model = ActiveModel {
            id: NotSet,
            username: Set(username),
            password: Set(password),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Unchanged(user.id),
            username: Set(user.username),
            password: Set(user.password),
        };

        let model = active_model.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let count = UserEntity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}
