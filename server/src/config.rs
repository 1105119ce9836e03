//! Gateway configuration parsed from environment variables.

use url::Url;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Errors produced while reading gateway configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `BACKEND_URL` is set but is not an absolute URL.
    #[error("invalid BACKEND_URL '{value}': {source}")]
    InvalidBackendUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// `BACKEND_URL` parsed but cannot carry a path (e.g. `mailto:`).
    #[error("BACKEND_URL must be an http(s) URL: {0}")]
    UnsupportedBackendScheme(String),

    /// `PORT` is set but is not a valid port number.
    #[error("invalid PORT '{0}'")]
    InvalidPort(String),

    /// The outbound HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Upstream base URL. `None` means every proxied call answers 503.
    pub backend_url: Option<Url>,
    pub bind_addr: String,
    pub port: u16,
}

impl GatewayConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `BACKEND_URL`: upstream base URL; unset or blank leaves the proxy unconfigured
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `PORT`: default 3000
    ///
    /// # Errors
    ///
    /// Returns an error if `BACKEND_URL` or `PORT` is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with an injectable variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `BACKEND_URL` or `PORT` is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = parse_backend_url(lookup("BACKEND_URL").as_deref())?;
        let bind_addr = lookup("BIND_ADDR")
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let port = parse_port(lookup("PORT").as_deref())?;
        Ok(Self { backend_url, bind_addr, port })
    }

    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_backend_url(raw: Option<&str>) -> Result<Option<Url>, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let trimmed = raw.trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBackendUrl { value: raw.to_owned(), source })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedBackendScheme(raw.to_owned()));
    }
    Ok(Some(url))
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidPort(value.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
