//! Where the client finds the gateway.

use url::Url;

use crate::net::error::ApiError;

pub const DEFAULT_PROXY_PREFIX: &str = "/proxy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Gateway origin, e.g. `http://localhost:3000`.
    pub base_url: Url,
    /// Path prefix of the gateway's proxy routes.
    pub proxy_prefix: String,
}

impl ClientConfig {
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] unless `base_url` is an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let url = Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!("{base_url}: expected an http(s) URL")));
        }
        Ok(Self { base_url: url, proxy_prefix: DEFAULT_PROXY_PREFIX.to_owned() })
    }

    #[must_use]
    pub fn with_proxy_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        self.proxy_prefix = if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") };
        self
    }

    /// `{prefix}/{route}` for a fixed route such as `auth/session`.
    #[must_use]
    pub fn path(&self, route: &str) -> String {
        format!("{}/{}", self.proxy_prefix, route.trim_start_matches('/'))
    }

    /// Path for `route` followed by caller-supplied segments, each percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if a segment is empty, `.` or `..`.
    pub fn endpoint(&self, route: &str, params: &[&str]) -> Result<String, ApiError> {
        if let Some(bad) = params.iter().find(|p| p.is_empty() || **p == "." || **p == "..") {
            return Err(ApiError::InvalidUrl(format!("invalid path segment {bad:?}")));
        }
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .clear()
            .extend(self.proxy_prefix.split('/').filter(|s| !s.is_empty()))
            .extend(route.split('/').filter(|s| !s.is_empty()))
            .extend(params);
        Ok(url.path().to_owned())
    }

    /// The refresh endpoint, which must never trigger a refresh of its own.
    #[must_use]
    pub fn refresh_path(&self) -> String {
        self.path("auth/refresh")
    }

    #[must_use]
    pub fn session_path(&self) -> String {
        self.path("auth/session")
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
