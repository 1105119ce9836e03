//! Client error taxonomy.

use super::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A 401 that survived refresh-and-retry, a failed refresh, or a 401 from
    /// the refresh endpoint itself. Carries no further classification.
    #[error("authentication failed: {0}")]
    Unauthorized(&'static str),

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response was not an envelope of the expected shape.
    #[error("response decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
