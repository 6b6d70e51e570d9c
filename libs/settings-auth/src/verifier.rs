//! Stateless bearer token verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::claims::{Claims, audiences_of};
use crate::config::JwtConfig;
use crate::errors::{AuthError, ConfigError};
use crate::principal::Role;

/// Validates a bearer credential and extracts its claims.
///
/// Implementations must be pure CPU work: no network, no storage, no suspension point.
pub trait TokenVerifier: Send + Sync {
    /// # Errors
    /// `InvalidToken` for a bad signature or malformed token, `ExpiredToken` past
    /// expiry, `MissingClaims` when `sub` or `exp` is absent.
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HS256 verifier keyed by the identity store's shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
    audiences: Vec<String>,
}

impl JwtVerifier {
    /// Build from configuration. The key is derived once and reused for every request.
    ///
    /// # Errors
    /// Fails when the secret is absent or empty.
    pub fn from_config(config: &JwtConfig) -> Result<Self, ConfigError> {
        let secret = config
            .jwt_secret
            .as_ref()
            .ok_or(ConfigError::MissingSecret)?;
        if secret.expose_secret().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self::new(secret.expose_secret().as_bytes(), config))
    }

    #[must_use]
    pub fn new(secret: &[u8], config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        validation.validate_exp = true;
        // Audience is matched below so that an unconfigured list means "any".
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if !config.issuers.is_empty() {
            validation.set_issuer(&config.issuers);
        }

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
            audiences: config.audiences.clone(),
        }
    }

    fn normalize(&self, raw: Map<String, Value>) -> Result<Claims, AuthError> {
        let subject = raw
            .get("sub")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("sub"))?;
        let subject = Uuid::parse_str(subject)
            .map_err(|_| AuthError::InvalidToken("subject is not a UUID".to_owned()))?;

        let exp = raw
            .get("exp")
            .and_then(Value::as_i64)
            .ok_or_else(|| missing("exp"))?;
        let expires_at = OffsetDateTime::from_unix_timestamp(exp)
            .map_err(|e| AuthError::InvalidToken(format!("exp out of range: {e}")))?;

        let audiences = audiences_of(&raw);
        if !self.audiences.is_empty() && !audiences.iter().any(|a| self.audiences.contains(a)) {
            return Err(AuthError::InvalidToken("audience not accepted".to_owned()));
        }

        let role = match raw.get("role") {
            None | Some(Value::Null) => Role::default(),
            Some(Value::String(s)) => s
                .parse::<Role>()
                .map_err(|e| AuthError::InvalidToken(e.to_string()))?,
            Some(_) => return Err(AuthError::InvalidToken("role is not a string".to_owned())),
        };

        Ok(Claims {
            subject,
            expires_at,
            issuer: raw.get("iss").and_then(Value::as_str).map(ToOwned::to_owned),
            audiences,
            role,
            email: raw
                .get("email")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
            extras: raw,
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaims {
                    claim: claim.clone(),
                },
                other => AuthError::InvalidToken(format!("{other:?}")),
            },
        )?;
        self.normalize(data.claims)
    }
}

fn missing(claim: &str) -> AuthError {
    AuthError::MissingClaims {
        claim: claim.to_owned(),
    }
}
