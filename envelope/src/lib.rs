//! Shared response envelope and models for the gateway and session client.
//!
//! This crate owns the wire representation used by both `server` and `client`.
//! Every backend response is wrapped as `{ headers: { status, description }, body }`
//! and `headers.status` always mirrors the HTTP status of the call that produced it.

pub mod locale;
pub mod models;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use locale::{DEFAULT_LOCALE, Locale, UnknownLocale};
pub use models::*;

/// Description sent with the 503 envelope when the backend cannot be reached.
pub const SERVICE_UNAVAILABLE_DESCRIPTION: &str = "Service Unavailable";

/// Error message sent with the 503 envelope when the backend cannot be reached.
pub const BACKEND_UNAVAILABLE_ERROR: &str = "Backend service unavailable";

/// Description the backend attaches to a 400 from the refresh endpoint when
/// the request carried no refresh cookie at all.
pub const REFRESH_TOKEN_REQUIRED_DESCRIPTION: &str = "Refresh token is required";

/// Structured equivalent of [`REFRESH_TOKEN_REQUIRED_DESCRIPTION`], carried in
/// the body's `code` field by backends that emit error codes.
pub const REFRESH_TOKEN_REQUIRED_CODE: &str = "REFRESH_TOKEN_REQUIRED";

// =============================================================================
// ENVELOPE
// =============================================================================

/// Status line of an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeaders {
    pub status: u16,
    pub description: String,
}

/// Uniform wrapper around every backend response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse<T = Value> {
    pub headers: ResponseHeaders,
    pub body: T,
}

impl<T> BackendResponse<T> {
    /// Build an envelope from its parts.
    pub fn new(status: u16, description: impl Into<String>, body: T) -> Self {
        Self { headers: ResponseHeaders { status, description: description.into() }, body }
    }

    /// HTTP status mirrored in the envelope headers.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.headers.status
    }

    /// True for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.headers.status)
    }

    /// Discard the headers and keep the body.
    pub fn into_body(self) -> T {
        self.body
    }
}

/// Free-function form of [`BackendResponse::is_success`].
#[must_use]
pub fn is_success<T>(response: &BackendResponse<T>) -> bool {
    response.is_success()
}

/// Free-function form of [`BackendResponse::into_body`].
pub fn extract_body<T>(response: BackendResponse<T>) -> T {
    response.into_body()
}

// =============================================================================
// ERROR BODY
// =============================================================================

/// Body shape of every non-2xx envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Body of an endpoint that answers with `T` on success and [`ApiErrorBody`]
/// otherwise. Bodies matching neither are kept as raw JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiBody<T> {
    Data(T),
    Error(ApiErrorBody),
    Other(Value),
}

impl<T> ApiBody<T> {
    pub fn data(self) -> Option<T> {
        match self {
            Self::Data(data) => Some(data),
            Self::Error(_) | Self::Other(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiErrorBody> {
        match self {
            Self::Error(error) => Some(error),
            Self::Data(_) | Self::Other(_) => None,
        }
    }
}

impl BackendResponse<ApiErrorBody> {
    /// Build an error envelope with only the `error` field set.
    pub fn error(status: u16, description: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(status, description, ApiErrorBody { error: error.into(), ..ApiErrorBody::default() })
    }

    /// The fixed envelope returned whenever the backend is unreachable or unconfigured.
    #[must_use]
    pub fn service_unavailable() -> Self {
        Self::error(503, SERVICE_UNAVAILABLE_DESCRIPTION, BACKEND_UNAVAILABLE_ERROR)
    }
}

impl BackendResponse<Value> {
    /// Whether this is the refresh endpoint's "no refresh cookie sent" rejection.
    ///
    /// Prefers a structured `code` in the body; falls back to the exact
    /// description text when the backend sends no code.
    #[must_use]
    pub fn is_missing_refresh_token(&self) -> bool {
        if self.headers.status != 400 {
            return false;
        }
        match self.body.get("code").and_then(Value::as_str) {
            Some(code) => code == REFRESH_TOKEN_REQUIRED_CODE,
            None => self.headers.description == REFRESH_TOKEN_REQUIRED_DESCRIPTION,
        }
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
