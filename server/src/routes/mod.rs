//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route under `/proxy` mirrors one backend endpoint under `/api`.
//! Handlers do no work of their own beyond naming the upstream path; the
//! method of the inbound request picks the handler and is forwarded as-is.

pub mod auth;
pub mod follows;
pub mod likes;
pub mod posts;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Local prefix the session client calls.
pub const PROXY_PREFIX: &str = "/proxy";

fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/auth/refresh", post(auth::refresh))
        .route("/posts", get(posts::collection).post(posts::collection))
        .route("/posts/{post_id}", get(posts::item).delete(posts::item))
        .route("/posts/{post_id}/replies", get(posts::replies).post(posts::replies))
        .route("/users", get(users::list))
        .route("/users/{user_id}/posts", get(users::posts))
        .route("/follows", post(follows::follow))
        .route("/follows/{user_id}", delete(follows::unfollow))
        .route("/follows/following", get(follows::following))
        .route("/follows/following/posts", get(follows::following_posts))
        .route("/follows/following/{user_id}", get(follows::following_of))
        .route("/follows/followers", get(follows::followers))
        .route("/follows/followers/{user_id}", get(follows::followers_of))
        .route("/likes", post(likes::like))
        .route("/likes/{post_id}", delete(likes::unlike))
        .route("/likes/check/{post_id}", get(likes::check))
        .route("/likes/post/{post_id}", get(likes::likers))
        .route("/likes/user", get(likes::liked))
        .route("/likes/user/{user_id}", get(likes::liked_by))
}

/// Full gateway router: proxy routes, health check, request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(PROXY_PREFIX, proxy_routes())
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
