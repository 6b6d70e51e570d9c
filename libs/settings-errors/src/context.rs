//! Request coordinates stamped onto every problem.

use http::{HeaderMap, Uri};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Path and correlation id of the request a problem belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub instance: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            instance: uri.path().to_owned(),
            request_id: headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
        }
    }

    /// Context of a request seen by a middleware or handler. Inside nested routers
    /// the path is taken from the original URI, before the prefix was stripped.
    #[cfg(feature = "axum")]
    #[must_use]
    pub fn of<B>(request: &axum::http::Request<B>) -> Self {
        let uri = request
            .extensions()
            .get::<axum::extract::OriginalUri>()
            .map_or(request.uri(), |original| &original.0);
        Self::new(uri, request.headers())
    }
}

#[cfg(feature = "axum")]
impl<S> axum::extract::FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<axum::extract::OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        Ok(Self::new(uri, &parts.headers))
    }
}

impl crate::Problem {
    /// Tie the problem to a request: its path becomes `instance`, its
    /// `x-request-id` becomes `trace_id`.
    pub fn in_request(mut self, ctx: &RequestContext) -> Self {
        self.instance.clone_from(&ctx.instance);
        self.trace_id.clone_from(&ctx.request_id);
        self
    }
}
