use std::collections::BTreeMap;

use axum::Json;
use axum::extract::Extension;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use time::OffsetDateTime;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when every dependency is reachable, `unhealthy` otherwise.
    pub status: &'static str,
    pub details: BTreeMap<&'static str, &'static str>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub version: &'static str,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "online",
        version: VERSION,
    })
}

/// Liveness plus a database round trip. Always 200; the body carries the verdict.
pub async fn health(Extension(db): Extension<DatabaseConnection>) -> Json<HealthResponse> {
    let database = match db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "health check: database ping failed");
            "error"
        }
    };

    Json(HealthResponse {
        status: if database == "connected" {
            "healthy"
        } else {
            "unhealthy"
        },
        details: BTreeMap::from([("database", database), ("services", "operational")]),
        timestamp: OffsetDateTime::now_utc(),
        version: VERSION,
    })
}
