//! Session store and authentication gate integration tests

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use storefront_server::api;
use storefront_server::auth::{SessionStore, TokenConfig, TokenService};
use storefront_server::common::AppError;
use storefront_server::core::{Config, ServerState};
use storefront_server::db::DbService;
use storefront_server::db::models::User;
use tempfile::TempDir;
use tower::ServiceExt;

/// Session inactivity window used by every test (10 minutes)
const TIMEOUT_MS: i64 = 10 * 60 * 1000;

async fn test_state(dir: &TempDir) -> ServerState {
    let config = Config {
        http_port: 0,
        database_path: dir.path().join("test.db").to_str().unwrap().to_string(),
        session_timeout_minutes: 10,
        tokens: TokenConfig {
            access_secret: "test-access-secret-0123456789abcdef".to_string(),
            refresh_secret: "test-refresh-secret-0123456789abcdef".to_string(),
        },
        environment: "development".to_string(),
    };
    ServerState::initialize(&config)
        .await
        .expect("Failed to initialize test state")
}

fn app(state: &ServerState) -> Router {
    api::build_app(state).with_state(state.clone())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Register a user, approve it with the given role, and log it in.
/// Returns (access_token, refresh_token, user_id).
async fn register_and_login(
    app: &Router,
    state: &ServerState,
    username: &str,
    role: &str,
) -> (String, String, i64) {
    let (status, _) = send(
        app,
        post_json(
            "/api/auth/register",
            json!({
                "username": username,
                "password": "secret123",
                "first_name": "Test",
                "last_name": "User",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    sqlx::query("UPDATE users SET approved = 1, role = ? WHERE username = ?")
        .bind(role)
        .bind(username)
        .execute(state.db.pool())
        .await
        .unwrap();

    let (status, body) = send(
        app,
        post_json(
            "/api/auth/login",
            json!({ "username": username, "password": "secret123" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    (
        data["access_token"].as_str().unwrap().to_string(),
        data["refresh_token"].as_str().unwrap().to_string(),
        data["user_id"].as_i64().unwrap(),
    )
}

async fn session_count(state: &ServerState, user_id: i64) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(state.db.pool())
        .await
        .unwrap();
    count
}

/// Push a session's last activity back in time by `ms` milliseconds
async fn backdate_session(state: &ServerState, user_id: i64, ms: i64) {
    sqlx::query("UPDATE sessions SET last_active = last_active - ? WHERE user_id = ?")
        .bind(ms)
        .bind(user_id)
        .execute(state.db.pool())
        .await
        .unwrap();
}

// ========== Session store ==========

async fn store_setup() -> (TempDir, DbService, SessionStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    let store = SessionStore::new(db.clone(), TIMEOUT_MS);
    (dir, db, store)
}

#[tokio::test]
async fn test_touch_creates_then_updates_one_row() {
    let (_dir, db, store) = store_setup().await;

    store.touch(1).await.unwrap();
    let first = store.read(1).await.unwrap();
    assert!(first.last_active > 0);

    store.touch(1).await.unwrap();
    let second = store.read(1).await.unwrap();
    assert!(second.last_active >= first.last_active);

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_read_missing_session_fails() {
    let (_dir, _db, store) = store_setup().await;

    let err = store.read(1).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_expire_is_idempotent() {
    let (_dir, _db, store) = store_setup().await;

    store.touch(1).await.unwrap();
    store.expire(1).await.unwrap();
    // A second expire of the same (now absent) session is a no-op
    store.expire(1).await.unwrap();

    assert!(matches!(
        store.read(1).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_slide_within_window_keeps_session() {
    let (_dir, _db, store) = store_setup().await;

    store.touch(1).await.unwrap();
    store.slide(1).await.unwrap();

    assert!(store.read(1).await.is_ok());
}

#[tokio::test]
async fn test_slide_after_window_deletes_session() {
    let (_dir, db, store) = store_setup().await;

    store.touch(1).await.unwrap();
    sqlx::query("UPDATE sessions SET last_active = last_active - ?")
        .bind(TIMEOUT_MS + 1000)
        .execute(db.pool())
        .await
        .unwrap();

    let err = store.slide(1).await.unwrap_err();
    assert!(matches!(err, AppError::SessionExpired));
    assert!(matches!(
        store.read(1).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

// ========== Authentication gate ==========

#[tokio::test]
async fn test_gate_rejects_missing_token() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (status, body) = send(&app, get("/api/orders", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");
}

#[tokio::test]
async fn test_gate_rejects_forged_token() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    // Signed with a different secret than the server's
    let outsider = TokenService::new(&TokenConfig {
        access_secret: "not-the-server-access-secret-000000".to_string(),
        refresh_secret: "not-the-server-refresh-secret-00000".to_string(),
    });
    let forged = outsider
        .issue_access(&User {
            id: 1,
            username: "mallory".to_string(),
            password_hash: String::new(),
            first_name: "Mallory".to_string(),
            last_name: "M".to_string(),
            role: "admin".to_string(),
            approved: true,
            created_at: 0,
        })
        .unwrap();

    let (status, _) = send(&app, get("/api/orders", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_skip_gate() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (status, _) = send(&app, get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/products", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_grants_protected_access() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (access, _, user_id) = register_and_login(&app, &state, "alice", "user").await;

    let (status, body) = send(&app, get("/api/orders", Some(&access))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    assert_eq!(session_count(&state, user_id).await, 1);
}

#[tokio::test]
async fn test_unapproved_account_cannot_login() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/register",
            json!({
                "username": "pending",
                "password": "secret123",
                "first_name": "Pending",
                "last_name": "User",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "username": "pending", "password": "secret123" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_token_rejected_as_access_credential() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (_, refresh, _) = register_and_login(&app, &state, "alice", "user").await;

    let (status, _) = send(&app, get("/api/orders", Some(&refresh))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_mints_working_access_token() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (_, refresh, _) = register_and_login(&app, &state, "alice", "user").await;

    let (status, body) = send(
        &app,
        post_json("/api/auth/refresh", json!({ "refresh_token": refresh }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let (status, _) = send(&app, get("/api/orders", Some(&access))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_stale_session_is_rejected_and_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (access, _, user_id) = register_and_login(&app, &state, "alice", "user").await;
    backdate_session(&state, user_id, TIMEOUT_MS + 1000).await;

    let (status, body) = send(&app, get("/api/orders", Some(&access))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3004");
    assert_eq!(session_count(&state, user_id).await, 0);

    // With the session gone, the still-valid token no longer opens the gate
    let (status, _) = send(&app, get("/api/orders", Some(&access))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activity_within_window_keeps_session_alive() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (access, _, user_id) = register_and_login(&app, &state, "alice", "user").await;
    backdate_session(&state, user_id, TIMEOUT_MS / 2).await;

    let (status, _) = send(&app, get("/api/orders", Some(&access))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session_count(&state, user_id).await, 1);
}

#[tokio::test]
async fn test_admin_route_requires_exact_role() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (user_access, _, _) = register_and_login(&app, &state, "alice", "user").await;
    let (status, _) = send(&app, get("/api/users", Some(&user_access))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Role comparison is an exact string match; "Admin" is not "admin"
    let (cased_access, _, _) = register_and_login(&app, &state, "carol", "Admin").await;
    let (status, _) = send(&app, get("/api/users", Some(&cased_access))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (admin_access, _, _) = register_and_login(&app, &state, "bob", "admin").await;
    let (status, body) = send(&app, get("/api/users", Some(&admin_access))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
}

#[tokio::test]
async fn test_logout_expires_session() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir).await;
    let app = app(&state);

    let (access, _, user_id) = register_and_login(&app, &state, "alice", "user").await;

    let (status, _) = send(&app, post_json("/api/auth/logout", json!({}), Some(&access))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session_count(&state, user_id).await, 0);
}
