use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::CorsConfig;

#[derive(Debug, thiserror::Error)]
pub enum CorsError {
    #[error(
        "allowed_origins=['*'] cannot be combined with allow_credentials=true; \
         list explicit origins when using credentials"
    )]
    WildcardWithCredentials,

    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("invalid header name: {0}")]
    InvalidHeader(String),
}

/// Build a CORS layer from config.
///
/// Methods and headers mirror the preflight request unless listed explicitly.
///
/// # Errors
/// Wildcard origins combined with credentials, or an entry that does not parse.
pub fn build_cors_layer(cfg: &CorsConfig) -> Result<CorsLayer, CorsError> {
    let has_wildcard_origin = cfg.allowed_origins.iter().any(|o| o == "*");
    if has_wildcard_origin && cfg.allow_credentials {
        return Err(CorsError::WildcardWithCredentials);
    }

    let origin = if has_wildcard_origin {
        warn!(
            "CORS is configured with allowed_origins=['*']; consider explicit origins in production"
        );
        AllowOrigin::any()
    } else {
        let origins = cfg
            .allowed_origins
            .iter()
            .map(|o| HeaderValue::from_str(o).map_err(|_| CorsError::InvalidOrigin(o.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    let methods = if cfg.allowed_methods.is_empty() {
        AllowMethods::mirror_request()
    } else {
        let methods = cfg
            .allowed_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_uppercase().as_bytes())
                    .map_err(|_| CorsError::InvalidMethod(m.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowMethods::list(methods)
    };

    let headers = if cfg.allowed_headers.is_empty() {
        AllowHeaders::mirror_request()
    } else {
        let headers = cfg
            .allowed_headers
            .iter()
            .map(|h| {
                HeaderName::from_bytes(h.as_bytes()).map_err(|_| CorsError::InvalidHeader(h.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowHeaders::list(headers)
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(cfg.allow_credentials);

    if cfg.max_age_seconds > 0 {
        layer = layer.max_age(Duration::from_secs(cfg.max_age_seconds));
    }
    Ok(layer)
}
