//! Authenticated fetch wrapper.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every gateway call from UI code goes through [`ApiClient::fetch`]. Only a
//! 401 is intercepted; every other status is decoded and handed back as data
//! for the caller to interpret.
//!
//! A single logical call walks `Idle -> Sent -> Refreshing -> Retried -> Done`.
//! `Retried` has no edge back to `Refreshing`, so a call is retried at most
//! once no matter what the retry returns.

use std::sync::Arc;

use envelope::{BackendResponse, Locale, SessionResponse, SessionUser};
use futures::FutureExt;
use reqwest::{Method, StatusCode};
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use super::refresh::{RefreshCoordinator, RefreshOutcome};
use super::transport::{ApiRequest, HttpTransport, RawResponse, Transport};
use crate::config::ClientConfig;
use crate::navigator::{Navigator, is_login_path};

/// Method, extra headers and JSON body for one call.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Defaults to GET.
    pub method: Option<Method>,
    /// Merged over `Content-Type: application/json`; caller values win.
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl FetchOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    #[must_use]
    pub fn method(method: Method) -> Self {
        Self { method: Some(method), ..Self::default() }
    }

    /// Attach `body` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be represented as JSON.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    fn into_request(self, path: &str) -> ApiRequest {
        let mut request = ApiRequest::json(self.method.unwrap_or(Method::GET), path);
        for (name, value) in &self.headers {
            request.headers.insert(name.clone(), value.clone());
        }
        request.body = self.body.map(|body| body.to_string());
        request
    }
}

enum CallState<T> {
    Idle,
    Sent(RawResponse),
    Refreshing,
    Retried(RawResponse),
    Done(Result<BackendResponse<T>, ApiError>),
}

struct Inner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    refresh: RefreshCoordinator,
}

/// Cheap to clone; clones share one transport and one refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>, navigator: Arc<dyn Navigator>) -> Self {
        Self { inner: Arc::new(Inner { config, transport, navigator, refresh: RefreshCoordinator::new() }) }
    }

    /// Client over a cookie-keeping [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport), navigator))
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Call `path` (e.g. `/proxy/posts`) with 401 recovery.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] when the call is still unauthorized after
    ///   refresh, the refresh fails, or `path` is the refresh endpoint itself.
    /// - [`ApiError::Transport`] when the call gets no response.
    /// - [`ApiError::Decode`] when the response is not a `BackendResponse<T>`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: FetchOptions,
    ) -> Result<BackendResponse<T>, ApiError> {
        let request = options.into_request(path);
        let mut state = CallState::Idle;
        loop {
            state = match state {
                CallState::Idle => CallState::Sent(self.inner.transport.send(&request).await?),
                CallState::Sent(response) if response.status != 401 => CallState::Done(decode(&response)),
                CallState::Sent(_) if self.is_refresh_endpoint(&request) => {
                    CallState::Done(Err(ApiError::Unauthorized("Refresh failed")))
                }
                CallState::Sent(_) => CallState::Refreshing,
                CallState::Refreshing => match self.refresh_token().await {
                    RefreshOutcome::Refreshed => CallState::Retried(self.inner.transport.send(&request).await?),
                    RefreshOutcome::NoRefreshToken | RefreshOutcome::Failed => {
                        CallState::Done(Err(ApiError::Unauthorized("Unauthorized")))
                    }
                },
                CallState::Retried(response) if response.status == 401 => {
                    self.clear_auth_and_redirect();
                    CallState::Done(Err(ApiError::Unauthorized("Unauthorized")))
                }
                CallState::Retried(response) => CallState::Done(decode(&response)),
                CallState::Done(result) => return result,
            };
        }
    }

    /// Call `path` once with no 401 handling, for login and registration where
    /// a 401 means bad credentials rather than an expired session.
    ///
    /// # Errors
    ///
    /// [`ApiError::Transport`] or [`ApiError::Decode`].
    pub async fn fetch_public<T: DeserializeOwned>(
        &self,
        path: &str,
        options: FetchOptions,
    ) -> Result<BackendResponse<T>, ApiError> {
        let response = self.inner.transport.send(&options.into_request(path)).await?;
        decode(&response)
    }

    /// The signed-in user, or `None` for anonymous visitors and unrecoverable
    /// sessions.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] other than [`ApiError::Unauthorized`].
    pub async fn get_session(&self) -> Result<Option<SessionUser>, ApiError> {
        let path = self.inner.config.session_path();
        match self.fetch::<Option<SessionResponse>>(&path, FetchOptions::get()).await {
            Ok(response) => Ok(response.body.and_then(|session| session.user)),
            Err(e) if e.is_auth() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// [`ApiClient::get_session`], navigating to `/{locale}/login` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get_session`].
    pub async fn require_auth(&self, locale: Locale) -> Result<Option<SessionUser>, ApiError> {
        let user = self.get_session().await?;
        if user.is_none() {
            self.inner.navigator.navigate(&locale.login_path());
        }
        Ok(user)
    }

    fn is_refresh_endpoint(&self, request: &ApiRequest) -> bool {
        request.route().trim_end_matches('/') == self.inner.config.refresh_path()
    }

    async fn refresh_token(&self) -> RefreshOutcome {
        let client = self.clone();
        self.inner
            .refresh
            .run(move || async move { client.request_refresh().await }.boxed())
            .await
    }

    async fn request_refresh(&self) -> RefreshOutcome {
        let request = ApiRequest::json(Method::POST, self.inner.config.refresh_path());
        match self.inner.transport.send(&request).await {
            Ok(response) if response.is_success() => {
                tracing::debug!("token refresh succeeded");
                RefreshOutcome::Refreshed
            }
            Ok(response) => {
                let missing_token = response.status == 400
                    && serde_json::from_slice::<BackendResponse>(&response.body)
                        .is_ok_and(|envelope| envelope.is_missing_refresh_token());
                if missing_token {
                    tracing::debug!("no refresh token present; leaving visitor in place");
                    return RefreshOutcome::NoRefreshToken;
                }
                tracing::warn!(status = response.status, "token refresh rejected");
                self.clear_auth_and_redirect();
                RefreshOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh request failed");
                self.clear_auth_and_redirect();
                RefreshOutcome::Failed
            }
        }
    }

    /// Drop client-held credentials and send the visitor to their locale's
    /// login page, unless they are already on a login page.
    fn clear_auth_and_redirect(&self) {
        let current = self.inner.navigator.current_path();
        if is_login_path(&current) {
            return;
        }
        self.inner.transport.clear_credentials();
        let target = Locale::from_path(&current).login_path();
        tracing::info!(from = %current, to = %target, "session unrecoverable; redirecting to login");
        self.inner.navigator.navigate(&target);
    }
}

/// An empty body (a relayed 204, say) decodes as an envelope built from the
/// status with a null body.
fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<BackendResponse<T>, ApiError> {
    if response.body.is_empty() {
        let description = StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or_default();
        let body = serde_json::from_value(Value::Null).map_err(ApiError::Decode)?;
        return Ok(BackendResponse::new(response.status, description, body));
    }
    serde_json::from_slice(&response.body).map_err(ApiError::Decode)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
