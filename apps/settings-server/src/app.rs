//! Router assembly and the HTTP server loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::routing::get;
use axum::{Extension, Json, Router};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use settings_auth::axum_ext::AuthState;
use settings_auth::{JwtVerifier, TokenVerifier};
use settings_errors::REQUEST_ID_HEADER;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use user_settings::UserSettingsModule;
use user_settings::api::rest::openapi::openapi;

use crate::config::{AppConfig, DatabaseConfig};
use crate::{cors, health, shutdown};

/// Open the connection pool described by `cfg`.
///
/// # Errors
/// Unreachable database or malformed URL.
pub async fn connect_db(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .context("failed to connect to database")?;
    tracing::info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}

/// Full application router: API routes under the prefix plus the middleware stack.
///
/// At runtime requests flow `SetRequestId` → `PropagateRequestId` → Trace → Timeout →
/// CORS → per-group auth → handler.
///
/// # Errors
/// Missing signing secret, invalid CORS settings, or an unserializable API document.
pub fn build_router(cfg: &AppConfig, db: &DatabaseConnection) -> anyhow::Result<Router> {
    let verifier: Arc<dyn TokenVerifier> =
        Arc::new(JwtVerifier::from_config(&cfg.auth).context("auth configuration")?);
    let auth = AuthState::new(verifier, None);
    let module = UserSettingsModule::new(db, &cfg.settings);

    let prefix = cfg.server.api_prefix.trim_end_matches('/');
    let doc = serde_json::to_value(openapi(prefix)).context("openapi document")?;

    let api = module
        .router(&auth)
        .route("/health", get(health::health))
        .route(
            "/openapi.json",
            get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        );

    let mut router = Router::new().route("/", get(health::root));
    router = if prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(prefix, api)
    };
    router = router.layer(Extension(db.clone()));

    if cfg.cors.enabled {
        router = router.layer(cors::build_cors_layer(&cfg.cors)?);
    }
    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        Duration::from_secs(cfg.server.request_timeout_secs),
    ));
    router = apply_trace_layer(router);

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    Ok(router)
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<axum::body::Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    request_id = %rid,
                    principal_id = Empty,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(
                |res: &Response<axum::body::Body>, latency: Duration, span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                },
            ),
    )
}

/// Connect, migrate if configured, and serve until a shutdown signal arrives.
///
/// # Errors
/// Startup failures: database, migrations, configuration, or binding the listener.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = connect_db(&cfg.database).await?;
    if cfg.database.run_migrations {
        UserSettingsModule::migrate(&db).await?;
    }

    let router = build_router(&cfg, &db)?;
    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind_addr))?;
    tracing::info!(addr = %cfg.server.bind_addr, prefix = %cfg.server.api_prefix, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "signal handling failed, shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    db.close().await.context("closing database pool")?;
    tracing::info!("Settings server stopped");
    Ok(())
}
