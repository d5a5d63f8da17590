//! User handlers.
//!
//! Stateless translation between HTTP and the user service contract;
//! no business logic lives here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::domain::{CreateUser, UpdateUser, User};
use crate::errors::{AppError, AppResult};
use crate::AppState;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create/users", post(create_user))
        .route("/all/users", get(get_all_users))
        .route(
            "/users/:id",
            get(get_user_by_id).put(update_user).delete(delete_user_by_id),
        )
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/create/users",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 200, description = "User created", body = User),
        (status = 400, description = "Empty or duplicate username", body = String)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> AppResult<Json<User>> {
    let user = state
        .user_service
        .create_user(payload.username, payload.password)
        .await?;

    Ok(Json(user))
}

/// List all users
#[utoipa::path(
    get,
    path = "/all/users",
    tag = "Users",
    responses(
        (status = 200, description = "Every stored user in creation order", body = Vec<User>)
    )
)]
pub async fn get_all_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.user_service.get_all_users().await?;
    Ok(Json(users))
}

/// Get user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = String)
    )
)]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = state.user_service.get_user_by_id(id).await?;
    Ok(Json(user))
}

/// Update a user's username and password
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid username, duplicate username, or unknown id", body = String)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUser>,
) -> Response {
    match state
        .user_service
        .update_user(id, payload.username, payload.password)
        .await
    {
        Ok(user) => Json(user).into_response(),
        // Update reports an unknown id as 400, not 404
        Err(err @ (AppError::Validation(_) | AppError::NotFound(_))) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Delete user by id
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = String)
    )
)]
pub async fn delete_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.user_service.delete_user_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
