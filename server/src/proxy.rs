//! Request forwarding to the upstream backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browser code only ever talks to this gateway. Each `/proxy/...` route
//! hands its inbound request to [`forward`], which rebuilds it against the
//! upstream base URL, carries the `Cookie` header across, and relays the
//! upstream status, JSON body and every `Set-Cookie` back unchanged.
//!
//! ERROR HANDLING
//! ==============
//! Nothing escapes [`forward`]. Requests axum rejects before a handler runs
//! (oversized body, undecodable path parameter) and path parameters that
//! would add or remove upstream segments get a 4xx envelope. Any other
//! failure (missing `BACKEND_URL`, transport error, non-JSON upstream body)
//! becomes the fixed 503 envelope. An empty upstream body is wrapped in an
//! envelope with a null body, except for statuses such as 204 that cannot
//! carry one. No retries happen here; the session client owns retry policy.

use std::fmt;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use envelope::{ApiErrorBody, BackendResponse};
use serde_json::Value;
use url::Url;

use crate::state::AppState;

/// Internal proxy failures. Each one is answered with an envelope, never raised.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("BACKEND_URL is not defined")]
    NotConfigured,

    /// A path parameter would have changed the shape of the upstream path.
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),

    #[error("backend URL cannot be a base")]
    CannotBeABase,

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned a non-JSON body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

// =============================================================================
// INBOUND REQUEST
// =============================================================================

/// The parts of a browser request the proxy forwards.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub method: Method,
    pub query: Option<String>,
    pub cookie: Option<HeaderValue>,
    pub body: Bytes,
}

impl<S> FromRequest<S> for Inbound
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let query = req.uri().query().map(str::to_owned);
        let cookie = req.headers().get(header::COOKIE).cloned();
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| rejection_response(rejection.status(), rejection.body_text()))?;
        Ok(Self { method, query, cookie, body })
    }
}

/// The single `{param}` of a route, percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param(pub String);

impl<S> FromRequestParts<S> for Param
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejection_response(rejection.status(), rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Envelope for a request axum refused before it reached a handler.
fn rejection_response(status: StatusCode, detail: String) -> Response {
    tracing::warn!(status = status.as_u16(), %detail, "rejected inbound request");
    let description = status.canonical_reason().unwrap_or("Bad Request");
    envelope_response(BackendResponse::error(status.as_u16(), description, detail))
}

/// Per-route overrides. Unset fields fall back to the inbound request.
#[derive(Debug, Clone, Default)]
pub struct ProxyOptions {
    pub method: Option<Method>,
    pub body: Option<Value>,
}

// =============================================================================
// UPSTREAM PATH
// =============================================================================

/// Upstream path built from fixed segments and caller-supplied parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPath {
    segments: Vec<String>,
}

impl UpstreamPath {
    /// `/api/{path}`, where `path` is a fixed, `/`-separated route.
    #[must_use]
    pub fn api(path: &str) -> Self {
        let segments = std::iter::once("api")
            .chain(path.split('/').filter(|s| !s.is_empty()))
            .map(str::to_owned)
            .collect();
        Self { segments }
    }

    /// Append one parameter as a single encoded segment.
    #[must_use]
    pub fn param(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    /// Append fixed segments after a parameter.
    #[must_use]
    pub fn then(mut self, path: &str) -> Self {
        self.segments
            .extend(path.split('/').filter(|s| !s.is_empty()).map(str::to_owned));
        self
    }

    /// Join onto `base`, keeping any path `base` already carries.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidSegment`] for empty, `.` or `..` segments.
    pub fn resolve(&self, base: &Url, query: Option<&str>) -> Result<Url, ProxyError> {
        if let Some(bad) = self
            .segments
            .iter()
            .find(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(ProxyError::InvalidSegment(bad.clone()));
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ProxyError::CannotBeABase)?
            .pop_if_empty()
            .extend(&self.segments);
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }
}

impl fmt::Display for UpstreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

// =============================================================================
// FORWARDING
// =============================================================================

/// Forward `inbound` to `path` on the upstream.
pub async fn forward(state: &AppState, inbound: Inbound, path: UpstreamPath) -> Response {
    forward_with(state, inbound, path, ProxyOptions::default()).await
}

/// Forward with an explicit method and/or body.
pub async fn forward_with(state: &AppState, inbound: Inbound, path: UpstreamPath, options: ProxyOptions) -> Response {
    match try_forward(state, inbound, &path, options).await {
        Ok(response) => response,
        Err(ProxyError::InvalidSegment(segment)) => {
            tracing::warn!(%path, ?segment, "rejected proxy path parameter");
            envelope_response(BackendResponse::error(400, "Bad Request", "Invalid path parameter"))
        }
        Err(e) => {
            tracing::error!(error = %e, %path, "backend proxy error");
            envelope_response(BackendResponse::service_unavailable())
        }
    }
}

async fn try_forward(
    state: &AppState,
    inbound: Inbound,
    path: &UpstreamPath,
    options: ProxyOptions,
) -> Result<Response, ProxyError> {
    let base = state.backend_url.as_deref().ok_or(ProxyError::NotConfigured)?;
    let url = path.resolve(base, inbound.query.as_deref())?;
    let method = options.method.unwrap_or(inbound.method);

    let mut request = state
        .http
        .request(method.clone(), url)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = inbound.cookie {
        request = request.header(header::COOKIE, cookie);
    }
    if let Some(body) = outbound_body(&method, options.body, inbound.body) {
        request = request.body(body);
    }

    let upstream = request.send().await?;
    let status = upstream.status();
    let set_cookies: Vec<HeaderValue> = upstream
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .cloned()
        .collect();
    let bytes = upstream.bytes().await?;

    let mut response = if bytes.is_empty() && forbids_body(status) {
        status.into_response()
    } else if bytes.is_empty() {
        let description = status.canonical_reason().unwrap_or_default();
        (status, Json(BackendResponse::new(status.as_u16(), description, Value::Null))).into_response()
    } else {
        serde_json::from_slice::<serde::de::IgnoredAny>(&bytes)?;
        (status, [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))], bytes).into_response()
    };
    for cookie in set_cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    tracing::debug!(%method, %path, status = status.as_u16(), "proxied request");
    Ok(response)
}

/// Statuses that cannot carry content on the wire.
fn forbids_body(status: StatusCode) -> bool {
    status.is_informational()
        || matches!(status, StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED)
}

/// Body to send upstream.
///
/// An explicit override always wins. Otherwise GET/HEAD send nothing, and any
/// other method forwards the inbound body only if it parses as JSON; an empty
/// or unparseable body is dropped rather than treated as an error.
fn outbound_body(method: &Method, explicit: Option<Value>, inbound: Bytes) -> Option<Bytes> {
    if let Some(value) = explicit {
        return Some(Bytes::from(value.to_string()));
    }
    if *method == Method::GET || *method == Method::HEAD {
        return None;
    }
    serde_json::from_slice::<serde::de::IgnoredAny>(&inbound)
        .ok()
        .map(|_| inbound)
}

/// JSON response whose HTTP status matches `headers.status`.
#[must_use]
pub fn envelope_response(envelope: BackendResponse<ApiErrorBody>) -> Response {
    let status = StatusCode::from_u16(envelope.status()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    (status, Json(envelope)).into_response()
}

#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;
