use thiserror::Error;

/// Token verification failures.
///
/// The variants exist for logs and tests only. Every one of them is rendered to
/// clients as the same generic 403.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("missing required claim: {claim}")]
    MissingClaims { claim: String },
}

/// Access decision failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("forbidden: {0}")]
    Forbidden(String),
}

/// Problems found while building a verifier from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("auth.jwt_secret is not set")]
    MissingSecret,

    #[error("auth.jwt_secret is empty")]
    EmptySecret,
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for AuthzError {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!(error = %self, "rejecting request: authorization failed");
        settings_errors::Problem::forbidden().into_response()
    }
}
