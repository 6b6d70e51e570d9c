use secrecy::SecretString;
use serde::Deserialize;

/// Token verification settings, loaded once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtConfig {
    /// Shared HS256 secret of the identity store.
    pub jwt_secret: Option<SecretString>,

    /// Accepted issuers (empty = not checked)
    pub issuers: Vec<String>,

    /// Accepted audiences (empty = not checked)
    pub audiences: Vec<String>,

    /// Clock skew tolerance for `exp`, in seconds
    pub leeway_seconds: u64,
}
