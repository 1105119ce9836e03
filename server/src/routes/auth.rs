//! Auth routes: login, registration, logout, session lookup, token refresh.
//!
//! The backend owns the access and refresh tokens. Both arrive here only as
//! HTTP-only `Set-Cookie` headers, which the proxy relays untouched.

use axum::extract::State;
use axum::response::Response;

use crate::proxy::{self, Inbound, UpstreamPath};
use crate::state::AppState;

/// `POST /proxy/auth/login`
pub async fn login(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("auth/login")).await
}

/// `POST /proxy/auth/register`
pub async fn register(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("auth/register")).await
}

/// `POST /proxy/auth/logout`. Usually sent with an empty body.
pub async fn logout(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("auth/logout")).await
}

/// `GET /proxy/auth/session`
pub async fn session(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("auth/session")).await
}

/// `POST /proxy/auth/refresh`. The refresh token rides in the cookie header.
pub async fn refresh(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("auth/refresh")).await
}
