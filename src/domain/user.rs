//! User domain entity and request types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User domain entity.
///
/// The password is stored and returned as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Storage-assigned identifier, immutable once set
    #[schema(example = 1)]
    pub id: i64,
    /// Unique, non-empty username
    #[schema(example = "kuromi")]
    pub username: String,
    #[schema(example = "1234")]
    pub password: String,
}

/// User creation request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUser {
    /// Username (must be non-empty and unique)
    #[serde(default)]
    #[schema(example = "kuromi")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "1234")]
    pub password: String,
}

/// User update request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUser {
    /// New username (must be non-empty and unique)
    #[serde(default)]
    #[schema(example = "my-melody")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "5678")]
    pub password: String,
}
