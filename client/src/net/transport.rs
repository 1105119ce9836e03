//! The HTTP seam under [`ApiClient`](super::api::ApiClient).
//!
//! DESIGN
//! ======
//! In a browser the cookie jar belongs to the page, so the transport owns it
//! here too: [`HttpTransport`] keeps the gateway's `Set-Cookie` values in a
//! `reqwest` jar and [`Transport::clear_credentials`] expires the two auth
//! cookies in it. Tests substitute an in-memory transport.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::config::ClientConfig;

/// Cookies dropped when a session is forcibly ended.
pub const AUTH_COOKIES: [&str; 2] = ["auth-token", "refresh-token"];

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client build failed: {0}")]
    Build(String),
}

/// One outbound call, relative to the gateway origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path plus optional query, e.g. `/proxy/posts?page=2`.
    pub path: String,
    pub headers: HeaderMap,
    /// Serialized JSON body.
    pub body: Option<String>,
}

impl ApiRequest {
    /// A request carrying only `Content-Type: application/json`.
    #[must_use]
    pub fn json(method: Method, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self { method, path: path.into(), headers, body: None }
    }

    /// Path without its query string.
    #[must_use]
    pub fn route(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(route, _)| route)
    }
}

/// Status and raw body of a completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request`. Any HTTP status, including 4xx/5xx, is `Ok`.
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError>;

    /// Forget the client-held auth and refresh cookies.
    fn clear_credentials(&self);
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    jar: Arc<Jar>,
    origin: Url,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    /// Build on a caller-prepared `reqwest` builder; the cookie store is added here.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_builder(config: &ClientConfig, builder: reqwest::ClientBuilder) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let http = builder
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { http, jar, origin: config.base_url.clone() })
    }

    /// The cookie jar, shared with the HTTP client.
    #[must_use]
    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.origin.join(&request.path)?;
        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?
            .to_vec();
        Ok(RawResponse { status, body })
    }

    fn clear_credentials(&self) {
        for name in AUTH_COOKIES {
            let expired = format!("{name}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/");
            self.jar.add_cookie_str(&expired, &self.origin);
        }
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;
