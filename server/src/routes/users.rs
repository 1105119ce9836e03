//! User directory routes.

use axum::extract::State;
use axum::response::Response;

use crate::proxy::{self, Inbound, Param, UpstreamPath};
use crate::state::AppState;

/// `GET /proxy/users`
pub async fn list(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("users")).await
}

/// `GET /proxy/users/{user_id}/posts`
pub async fn posts(State(state): State<AppState>, Param(user_id): Param, inbound: Inbound) -> Response {
    let path = UpstreamPath::api("users").param(user_id).then("posts");
    proxy::forward(&state, inbound, path).await
}
