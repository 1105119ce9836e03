//! Like routes.

use axum::extract::State;
use axum::response::Response;

use crate::proxy::{self, Inbound, Param, UpstreamPath};
use crate::state::AppState;

/// `POST /proxy/likes`
pub async fn like(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("likes")).await
}

/// `DELETE /proxy/likes/{post_id}`
pub async fn unlike(State(state): State<AppState>, Param(post_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("likes").param(post_id)).await
}

/// `GET /proxy/likes/check/{post_id}`: whether the caller liked a post.
pub async fn check(State(state): State<AppState>, Param(post_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("likes/check").param(post_id)).await
}

/// `GET /proxy/likes/post/{post_id}`: users who liked a post.
pub async fn likers(State(state): State<AppState>, Param(post_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("likes/post").param(post_id)).await
}

/// `GET /proxy/likes/user`: posts the caller liked.
pub async fn liked(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("likes/user")).await
}

/// `GET /proxy/likes/user/{user_id}`
pub async fn liked_by(State(state): State<AppState>, Param(user_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("likes/user").param(user_id)).await
}
