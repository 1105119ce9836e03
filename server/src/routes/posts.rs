//! Post and reply routes.

use axum::extract::State;
use axum::response::Response;

use crate::proxy::{self, Inbound, Param, UpstreamPath};
use crate::state::AppState;

/// `GET /proxy/posts` lists, `POST /proxy/posts` creates.
pub async fn collection(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("posts")).await
}

/// `GET` or `DELETE /proxy/posts/{post_id}`
pub async fn item(State(state): State<AppState>, Param(post_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("posts").param(post_id)).await
}

/// `GET` or `POST /proxy/posts/{post_id}/replies`
pub async fn replies(State(state): State<AppState>, Param(post_id): Param, inbound: Inbound) -> Response {
    let path = UpstreamPath::api("posts").param(post_id).then("replies");
    proxy::forward(&state, inbound, path).await
}
