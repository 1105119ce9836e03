//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! gateway keeps no per-user state: it holds only the outbound HTTP client
//! and the upstream base URL, so every inbound request is independent.

use std::sync::Arc;

use url::Url;

use crate::config::{ConfigError, GatewayConfig};

/// Clone is required by Axum; both fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Outbound client. Has no cookie store: cookies travel only as the
    /// forwarded `Cookie` header of the request being proxied.
    pub http: reqwest::Client,
    /// `None` when `BACKEND_URL` is unset.
    pub backend_url: Option<Arc<Url>>,
}

impl AppState {
    /// Build state from parsed gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound HTTP client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_client(http, config.backend_url.clone()))
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, backend_url: Option<Url>) -> Self {
        Self { http, backend_url: backend_url.map(Arc::new) }
    }
}
