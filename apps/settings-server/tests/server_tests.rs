#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The assembled router: public endpoints, middleware stack and the API document.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use sea_orm::DatabaseConnection;
use secrecy::SecretString;
use serde_json::Value;
use settings_server::config::{AppConfig, DatabaseConfig};
use settings_server::{build_router, connect_db};
use tempfile::TempDir;
use tower::ServiceExt;
use user_settings::UserSettingsModule;

async fn setup() -> (TempDir, DatabaseConnection, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = AppConfig::default();
    cfg.database = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("server.db").display()),
        max_connections: 2,
        ..DatabaseConfig::default()
    };
    cfg.auth.jwt_secret = Some(SecretString::from("server-test-secret-server-test-0001"));

    let db = connect_db(&cfg.database).await.unwrap();
    UserSettingsModule::migrate(&db).await.unwrap();
    (dir, db, cfg)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

#[tokio::test]
async fn root_reports_online() {
    let (_dir, db, cfg) = setup().await;
    let app = build_router(&cfg, &db).unwrap();

    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_reports_database_state() {
    let (_dir, db, cfg) = setup().await;
    let app = build_router(&cfg, &db).unwrap();

    let (status, _, body) = get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["database"], "connected");
    assert_eq!(body["details"]["services"], "operational");
    assert!(body["timestamp"].as_str().is_some());

    db.clone().close().await.unwrap();
    let (status, _, body) = get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["details"]["database"], "error");
}

#[tokio::test]
async fn openapi_document_uses_configured_prefix() {
    let (_dir, db, mut cfg) = setup().await;
    cfg.server.api_prefix = "/settings-api/".to_owned();
    let app = build_router(&cfg, &db).unwrap();

    let (status, _, body) = get(&app, "/settings-api/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/settings-api/users/me/settings"));
    assert!(paths.contains_key("/settings-api/users/{id}/settings"));
    assert!(body["components"]["securitySchemes"]["bearerAuth"].is_object());
}

#[tokio::test]
async fn protected_routes_reject_anonymous_callers() {
    let (_dir, db, cfg) = setup().await;
    let app = build_router(&cfg, &db).unwrap();

    let (status, headers, body) = get(&app, "/api/v1/users/me/settings").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    assert_eq!(body["detail"], "Forbidden");
    assert_eq!(body["instance"], "/api/v1/users/me/settings");
    let request_id = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(body["trace_id"], request_id);
}

#[tokio::test]
async fn request_id_is_generated_or_propagated() {
    let (_dir, db, cfg) = setup().await;
    let app = build_router(&cfg, &db).unwrap();

    let (_, headers, _) = get(&app, "/").await;
    let generated = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "req-42");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let (_dir, db, cfg) = setup().await;
    let app = build_router(&cfg, &db).unwrap();

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/users/me/settings")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn missing_secret_fails_router_assembly() {
    let (_dir, db, mut cfg) = setup().await;
    cfg.auth.jwt_secret = None;
    assert!(build_router(&cfg, &db).is_err());
}
