//! Integration tests for the HTTP surface.
//!
//! These drive the real router through tower's `oneshot` with an
//! in-memory repository standing in for the database, so the full
//! handler -> service -> repository path is exercised without
//! external infrastructure.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

use user_registry::api::{create_router, AppState};
use user_registry::domain::User;
use user_registry::errors::{AppError, AppResult};
use user_registry::infra::{Database, UserRepository};
use user_registry::services::UserManager;

// =============================================================================
// In-memory repository
// =============================================================================

/// Repository over a plain Vec, mirroring relational semantics:
/// monotonic ids that are never reused, insertion-ordered listing.
#[derive(Default)]
struct InMemoryUsers {
    state: Mutex<Store>,
}

#[derive(Default)]
struct Store {
    rows: Vec<User>,
    last_id: i64,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        let store = self.state.lock().unwrap();
        Ok(store.rows.iter().any(|u| u.username == username))
    }

    async fn exists_by_username_excluding(&self, username: &str, id: i64) -> AppResult<bool> {
        let store = self.state.lock().unwrap();
        Ok(store.rows.iter().any(|u| u.username == username && u.id != id))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let store = self.state.lock().unwrap();
        Ok(store.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let store = self.state.lock().unwrap();
        Ok(store.rows.clone())
    }

    async fn create(&self, username: String, password: String) -> AppResult<User> {
        let mut store = self.state.lock().unwrap();
        store.last_id += 1;
        let user = User {
            id: store.last_id,
            username,
            password,
        };
        store.rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut store = self.state.lock().unwrap();
        let row = store
            .rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::internal("row vanished during update"))?;
        *row = user.clone();
        Ok(user)
    }

    async fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let store = self.state.lock().unwrap();
        Ok(store.rows.iter().any(|u| u.id == id))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let mut store = self.state.lock().unwrap();
        store.rows.retain(|u| u.id != id);
        Ok(())
    }
}

// =============================================================================
// Test helpers
// =============================================================================

fn test_app() -> Router {
    let repo = Arc::new(InMemoryUsers::default());
    let user_service = Arc::new(UserManager::new(repo));
    let database = Arc::new(Database::from_connection(DatabaseConnection::Disconnected));

    create_router(AppState::new(user_service, database))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, String) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn create_user(app: &Router, username: &str, password: &str) -> (StatusCode, String) {
    send(
        app,
        "POST",
        "/create/users",
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await
}

fn parse_user(body: &str) -> User {
    serde_json::from_str(body).unwrap()
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn create_user_returns_created_entity() {
    let app = test_app();

    let (status, body) = create_user(&app, "쿠로미", "1234").await;

    assert_eq!(status, StatusCode::OK);
    let user = parse_user(&body);
    assert_eq!(user.id, 1);
    assert_eq!(user.username, "쿠로미");
    assert_eq!(user.password, "1234");
}

#[tokio::test]
async fn create_user_with_empty_username_is_rejected() {
    let app = test_app();

    let (status, body) = create_user(&app, "", "1234").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Username cannot be empty");
}

#[tokio::test]
async fn create_user_with_duplicate_username_is_rejected() {
    let app = test_app();
    create_user(&app, "쿠로미", "1234").await;

    let (status, body) = create_user(&app, "쿠로미", "1234").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Username already exists");
}

// =============================================================================
// Read
// =============================================================================

#[tokio::test]
async fn get_all_users_on_empty_store_returns_empty_list() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/all/users", None).await;

    assert_eq!(status, StatusCode::OK);
    let users: Vec<User> = serde_json::from_str(&body).unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn get_all_users_returns_users_in_creation_order() {
    let app = test_app();
    create_user(&app, "쿠로미", "1234").await;
    create_user(&app, "폼폼푸린", "1234").await;

    let (status, body) = send(&app, "GET", "/all/users", None).await;

    assert_eq!(status, StatusCode::OK);
    let users: Vec<User> = serde_json::from_str(&body).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].username, "쿠로미");
    assert_eq!(users[1].username, "폼폼푸린");
}

#[tokio::test]
async fn get_user_by_id_returns_user() {
    let app = test_app();
    let (_, body) = create_user(&app, "쿠로미", "1234").await;
    let id = parse_user(&body).id;

    let (status, body) = send(&app, "GET", &format!("/users/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_user(&body).username, "쿠로미");
}

#[tokio::test]
async fn get_user_by_id_unknown_id_returns_not_found() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/users/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "User not found with id: 999");
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn update_user_overwrites_username_and_password() {
    let app = test_app();
    let (_, body) = create_user(&app, "폼폼푸린", "1234").await;
    let id = parse_user(&body).id;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/{}", id),
        Some(serde_json::json!({ "username": "짱구", "password": "5678" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let user = parse_user(&body);
    assert_eq!(user.id, id);
    assert_eq!(user.username, "짱구");
    assert_eq!(user.password, "5678");
}

#[tokio::test]
async fn update_user_unknown_id_maps_to_bad_request() {
    let app = test_app();

    // This route reports a missing id as 400, unlike GET and DELETE
    let (status, body) = send(
        &app,
        "PUT",
        "/users/999",
        Some(serde_json::json!({ "username": "포치타", "password": "5678" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "User not found with id: 999");
}

#[tokio::test]
async fn update_user_to_username_of_other_user_is_rejected() {
    let app = test_app();
    create_user(&app, "user1", "1234").await;
    let (_, body) = create_user(&app, "user2", "5678").await;
    let id = parse_user(&body).id;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/{}", id),
        Some(serde_json::json!({ "username": "user1", "password": "9999" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Username already exists");
}

#[tokio::test]
async fn update_user_keeping_own_username_succeeds() {
    let app = test_app();
    let (_, body) = create_user(&app, "user1", "1234").await;
    let id = parse_user(&body).id;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/{}", id),
        Some(serde_json::json!({ "username": "user1", "password": "5678" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let user = parse_user(&body);
    assert_eq!(user.username, "user1");
    assert_eq!(user.password, "5678");
}

#[tokio::test]
async fn update_user_with_empty_username_is_rejected() {
    let app = test_app();
    let (_, body) = create_user(&app, "user1", "1234").await;
    let id = parse_user(&body).id;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/{}", id),
        Some(serde_json::json!({ "username": "", "password": "5678" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Username cannot be empty");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn delete_user_removes_user() {
    let app = test_app();
    let (_, body) = create_user(&app, "testuser", "1234").await;
    let id = parse_user(&body).id;

    let (status, body) = send(&app, "DELETE", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _) = send(&app, "GET", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_user_unknown_id_returns_not_found() {
    let app = test_app();

    let (status, body) = send(&app, "DELETE", "/users/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "User not found with id: 999");
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let app = test_app();
    let (_, body) = create_user(&app, "first", "1234").await;
    let first_id = parse_user(&body).id;

    send(&app, "DELETE", &format!("/users/{}", first_id), None).await;

    let (_, body) = create_user(&app, "second", "1234").await;
    assert!(parse_user(&body).id > first_id);
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn full_user_lifecycle() {
    let app = test_app();

    // Create
    let (status, body) = create_user(&app, "쿠로미", "1234").await;
    assert_eq!(status, StatusCode::OK);
    let user = parse_user(&body);
    assert_eq!(user.username, "쿠로미");

    // Duplicate create is rejected
    let (status, body) = create_user(&app, "쿠로미", "1234").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Username already exists");

    // One entry listed
    let (status, body) = send(&app, "GET", "/all/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users: Vec<User> = serde_json::from_str(&body).unwrap();
    assert_eq!(users.len(), 1);

    // Delete it
    let (status, _) = send(&app, "DELETE", &format!("/users/{}", user.id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Gone afterwards
    let (status, _) = send(&app, "GET", &format!("/users/{}", user.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn root_returns_welcome_message() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Welcome to User Registry");
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["services"]["database"]["status"], "unhealthy");
}
