//! Session-aware client for the micro-posting gateway.
//!
//! SYSTEM CONTEXT
//! ==============
//! UI code never calls the gateway directly. It goes through [`ApiClient`],
//! which turns a 401 into one shared token refresh plus a single retry, and
//! sends the visitor to the login page when the session cannot be recovered.
//! [`SessionController`] layers the current-user state on top of that.

pub mod config;
pub mod navigator;
pub mod net;
pub mod state;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use navigator::{MemoryNavigator, Navigator};
pub use net::api::{ApiClient, FetchOptions};
pub use net::error::ApiError;
pub use net::refresh::{RefreshCoordinator, RefreshOutcome};
pub use net::transport::{ApiRequest, HttpTransport, RawResponse, Transport, TransportError};
pub use state::auth::{AuthState, SessionController, SessionOptions};
