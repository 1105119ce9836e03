//! Follow graph routes.

use axum::extract::State;
use axum::response::Response;

use crate::proxy::{self, Inbound, Param, UpstreamPath};
use crate::state::AppState;

/// `POST /proxy/follows`
pub async fn follow(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("follows")).await
}

/// `DELETE /proxy/follows/{user_id}`
pub async fn unfollow(State(state): State<AppState>, Param(user_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("follows").param(user_id)).await
}

/// `GET /proxy/follows/following`: users the caller follows.
pub async fn following(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("follows/following")).await
}

/// `GET /proxy/follows/following/posts`: feed of followed users' posts.
pub async fn following_posts(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("follows/following/posts")).await
}

/// `GET /proxy/follows/following/{user_id}`
pub async fn following_of(State(state): State<AppState>, Param(user_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("follows/following").param(user_id)).await
}

/// `GET /proxy/follows/followers`: the caller's followers.
pub async fn followers(State(state): State<AppState>, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("follows/followers")).await
}

/// `GET /proxy/follows/followers/{user_id}`
pub async fn followers_of(State(state): State<AppState>, Param(user_id): Param, inbound: Inbound) -> Response {
    proxy::forward(&state, inbound, UpstreamPath::api("follows/followers").param(user_id)).await
}
