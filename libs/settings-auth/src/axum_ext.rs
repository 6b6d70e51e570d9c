//! Axum middleware and extractor for bearer auth

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use settings_errors::{Problem, RequestContext};

use crate::{
    authorizer::AuthorizationGate,
    errors::AuthzError,
    principal::{Principal, Role},
    verifier::TokenVerifier,
};

/// Extractor for the authenticated [`Principal`]; requires [`require_auth`] upstream.
#[derive(Debug, Clone)]
pub struct Authz(pub Principal);

impl<S> FromRequestParts<S> for Authz
where
    S: Send + Sync,
{
    type Rejection = AuthzError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authz)
            .ok_or_else(|| {
                tracing::error!("Principal not found: auth middleware not configured for route");
                AuthzError::Forbidden("no principal".to_owned())
            })
    }
}

/// State for [`require_auth`]: the shared verifier plus this route group's gate.
#[derive(Clone)]
pub struct AuthState {
    verifier: Arc<dyn TokenVerifier>,
    gate: AuthorizationGate,
}

impl AuthState {
    #[must_use]
    pub fn new(verifier: Arc<dyn TokenVerifier>, required: Option<Role>) -> Self {
        Self {
            verifier,
            gate: AuthorizationGate::new(required),
        }
    }

    /// Same verifier, different role requirement.
    #[must_use]
    pub fn requiring(&self, role: Role) -> Self {
        Self::new(Arc::clone(&self.verifier), Some(role))
    }
}

/// Auth middleware.
///
/// Extracts the bearer token, verifies it, runs the gate and stores the resulting
/// [`Principal`] in request extensions. Every failure is the same generic 403,
/// carrying the request path and `x-request-id`. CORS preflight requests pass
/// through untouched.
pub async fn require_auth(
    State(AuthState { verifier, gate }): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    let claims = match extract_bearer_token(request.headers()) {
        Some(token) => match verifier.verify(token) {
            Ok(claims) => Some(claims),
            Err(err) => return forbidden(&err, &request),
        },
        None => None,
    };

    let principal = match gate.check(claims.as_ref()) {
        Ok(p) => p,
        Err(err) => return forbidden(&err, &request),
    };

    tracing::Span::current().record("principal_id", tracing::field::display(principal.id));
    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn forbidden(reason: &dyn std::fmt::Display, request: &Request) -> Response {
    tracing::debug!(error = %reason, "rejecting request");
    Problem::forbidden()
        .in_request(&RequestContext::of(request))
        .into_response()
}

/// Extract a Bearer token from the Authorization header. The scheme is case-insensitive;
/// any other scheme counts as no credential.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
