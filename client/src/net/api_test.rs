use std::time::Duration;

use envelope::{ApiBody, PostResponse, REFRESH_TOKEN_REQUIRED_CODE};
use futures::future::join_all;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::json;

use super::*;
use crate::test_support::{MockTransport, Reply, client_at, session_user};

const POSTS: &str = "/proxy/posts";
const REFRESH: &str = "/proxy/auth/refresh";
const SESSION: &str = "/proxy/auth/session";

fn created_post() -> Value {
    json!({ "post": {
        "id": "p1",
        "content": "hello",
        "createdAt": "2026-01-01T00:00:00Z",
        "user": session_user(),
    }})
}

// =============================================================================
// PASS-THROUGH
// =============================================================================

#[tokio::test]
async fn non_401_statuses_are_returned_as_data() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::envelope(422, "Unprocessable Entity", json!({ "error": "too long" }))]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    let response = client.fetch::<Value>(POSTS, FetchOptions::post()).await.unwrap();

    assert_eq!(response.status(), 422);
    assert_eq!(response.body["error"], "too long");
    assert_eq!(transport.routes(), vec![POSTS]);
    assert!(navigator.redirects().is_empty());
}

#[tokio::test]
async fn body_that_is_not_an_envelope_is_a_decode_error() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::raw(200, b"<html>".to_vec())]);
    let (client, _) = client_at(&transport, "/en/feed");

    let err = client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn empty_body_decodes_as_null_envelope() {
    let transport = MockTransport::new();
    transport.on("/proxy/likes/p1", [Reply::raw(204, Vec::new())]);
    let (client, _) = client_at(&transport, "/en/feed");

    let response = client.fetch::<Value>("/proxy/likes/p1", FetchOptions::delete()).await.unwrap();

    assert_eq!(response.status(), 204);
    assert_eq!(response.headers.description, "No Content");
    assert_eq!(response.body, Value::Null);
}

#[tokio::test]
async fn empty_body_for_a_required_shape_is_a_decode_error() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::raw(200, Vec::new())]);
    let (client, _) = client_at(&transport, "/en/feed");

    let err = client.fetch::<PostResponse>(POSTS, FetchOptions::get()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error_without_refresh() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::unreachable()]);
    let (client, _) = client_at(&transport, "/en/feed");

    let err = client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(transport.calls(REFRESH), 0);
}

#[tokio::test]
async fn caller_headers_are_merged_over_json_content_type() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::ok(json!({ "posts": [] }))]);
    let (client, _) = client_at(&transport, "/en/feed");

    let mut options = FetchOptions::post().json(&json!({ "content": "hi" })).unwrap();
    options.headers.insert("x-request-id", HeaderValue::from_static("r-1"));
    client.fetch::<Value>(POSTS, options).await.unwrap();

    let sent = &transport.sent()[0];
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.headers[CONTENT_TYPE], "application/json");
    assert_eq!(sent.headers["x-request-id"], "r-1");
    assert_eq!(sent.body.as_deref(), Some(r#"{"content":"hi"}"#));
}

#[tokio::test]
async fn caller_content_type_wins() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::ok(json!({}))]);
    let (client, _) = client_at(&transport, "/en/feed");

    let mut options = FetchOptions::get();
    options.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"));
    client.fetch::<Value>(POSTS, options).await.unwrap();

    assert_eq!(transport.sent()[0].headers[CONTENT_TYPE], "application/merge-patch+json");
}

// =============================================================================
// REFRESH AND RETRY
// =============================================================================

#[tokio::test]
async fn expired_access_token_is_refreshed_and_create_post_retried() {
    let transport = MockTransport::new();
    transport
        .on(POSTS, [Reply::unauthorized(), Reply::envelope(201, "Created", created_post())])
        .on(REFRESH, [Reply::ok(json!({ "message": "refreshed" }))]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    let options = FetchOptions::post().json(&json!({ "content": "hello" })).unwrap();
    let response = client.fetch::<ApiBody<PostResponse>>(POSTS, options).await.unwrap();

    assert_eq!(response.status(), 201);
    assert_eq!(response.into_body().data().unwrap().post.id, "p1");
    assert_eq!(transport.routes(), vec![POSTS, REFRESH, POSTS]);
    let sent = transport.sent();
    assert_eq!(sent[0], sent[2]);
    assert_eq!(sent[1].method, Method::POST);
    assert_eq!(sent[1].body, None);
    assert!(navigator.redirects().is_empty());
    assert_eq!(transport.clears(), 0);
}

#[tokio::test]
async fn retry_that_is_still_unauthorized_fails_without_second_refresh() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::unauthorized()]).on(REFRESH, [Reply::ok(json!({}))]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    let err = client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(transport.routes(), vec![POSTS, REFRESH, POSTS]);
    assert_eq!(transport.clears(), 1);
    assert_eq!(navigator.redirects(), vec!["/en/login"]);
}

#[tokio::test]
async fn unauthorized_refresh_endpoint_never_refreshes_itself() {
    let transport = MockTransport::new();
    transport.on(REFRESH, [Reply::unauthorized()]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    let err = client.fetch::<Value>(REFRESH, FetchOptions::post()).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized("Refresh failed")));
    assert_eq!(transport.calls(REFRESH), 1);
    assert!(navigator.redirects().is_empty());
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let transport = MockTransport::new();
    let mut posts = vec![Reply::unauthorized(); 5];
    posts.push(Reply::ok(json!({ "posts": [] })));
    transport
        .on(POSTS, posts)
        .on(REFRESH, [Reply::ok(json!({})).delayed(Duration::from_millis(50))]);
    let (client, _) = client_at(&transport, "/en/feed");

    let calls = (0..5).map(|_| client.fetch::<Value>(POSTS, FetchOptions::get()));
    let results = join_all(calls).await;

    assert_eq!(transport.calls(REFRESH), 1);
    assert_eq!(transport.calls(POSTS), 10);
    assert!(results.iter().all(|r| r.as_ref().is_ok_and(|e| e.status() == 200)));
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn concurrent_callers_all_observe_a_failed_refresh() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::unauthorized()]).on(
        REFRESH,
        [Reply::envelope(401, "Unauthorized", json!({ "error": "expired" })).delayed(Duration::from_millis(50))],
    );
    let (client, navigator) = client_at(&transport, "/ar/feed");

    let calls = (0..3).map(|_| client.fetch::<Value>(POSTS, FetchOptions::get()));
    let results = join_all(calls).await;

    assert!(results.iter().all(|r| r.as_ref().is_err_and(ApiError::is_auth)));
    assert_eq!(transport.calls(REFRESH), 1);
    assert_eq!(transport.calls(POSTS), 3);
    assert_eq!(navigator.redirects(), vec!["/ar/login"]);
}

#[tokio::test]
async fn later_401_starts_a_fresh_refresh() {
    let transport = MockTransport::new();
    transport
        .on(POSTS, [Reply::unauthorized(), Reply::ok(json!({})), Reply::unauthorized(), Reply::ok(json!({}))])
        .on(REFRESH, [Reply::ok(json!({}))]);
    let (client, _) = client_at(&transport, "/en/feed");

    client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap();
    client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap();

    assert_eq!(transport.calls(REFRESH), 2);
}

// =============================================================================
// REFRESH FAILURE POLICY
// =============================================================================

#[tokio::test]
async fn missing_refresh_token_fails_quietly() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::unauthorized()]).on(REFRESH, [Reply::missing_refresh_token()]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    let err = client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(transport.calls(POSTS), 1);
    assert!(navigator.redirects().is_empty());
    assert_eq!(transport.clears(), 0);
}

#[tokio::test]
async fn missing_refresh_token_code_fails_quietly() {
    let transport = MockTransport::new();
    let body = json!({ "error": "Bad Request", "code": REFRESH_TOKEN_REQUIRED_CODE });
    transport
        .on(POSTS, [Reply::unauthorized()])
        .on(REFRESH, [Reply::envelope(400, "Bad Request", body)]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();

    assert!(navigator.redirects().is_empty());
}

#[tokio::test]
async fn other_400_from_refresh_redirects() {
    let transport = MockTransport::new();
    transport
        .on(POSTS, [Reply::unauthorized()])
        .on(REFRESH, [Reply::envelope(400, "Invalid refresh token", json!({ "error": "invalid" }))]);
    let (client, navigator) = client_at(&transport, "/ar/users");

    client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();

    assert_eq!(transport.clears(), 1);
    assert_eq!(navigator.redirects(), vec!["/ar/login"]);
}

#[tokio::test]
async fn unreachable_refresh_counts_as_failure() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::unauthorized()]).on(REFRESH, [Reply::unreachable()]);
    let (client, navigator) = client_at(&transport, "/en/my-posts");

    let err = client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(navigator.redirects(), vec!["/en/login"]);
}

#[tokio::test]
async fn unknown_locale_redirects_to_default_login() {
    let transport = MockTransport::new();
    transport.on(POSTS, [Reply::unauthorized()]).on(REFRESH, [Reply::ok(json!({}))]);
    let (client, navigator) = client_at(&transport, "/fr/feed");

    client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();

    assert_eq!(navigator.redirects(), vec!["/en/login"]);
}

#[tokio::test]
async fn no_redirect_or_clear_when_already_on_login_page() {
    let transport = MockTransport::new();
    transport
        .on(POSTS, [Reply::unauthorized()])
        .on(REFRESH, [Reply::envelope(500, "Internal Server Error", json!({ "error": "boom" }))]);
    let (client, navigator) = client_at(&transport, "/ar/login");

    client.fetch::<Value>(POSTS, FetchOptions::get()).await.unwrap_err();

    assert!(navigator.redirects().is_empty());
    assert_eq!(transport.clears(), 0);
}

// =============================================================================
// UNINTERCEPTED CALLS
// =============================================================================

#[tokio::test]
async fn fetch_public_relays_401_without_refresh() {
    let transport = MockTransport::new();
    transport.on(
        "/proxy/auth/login",
        [Reply::envelope(401, "Unauthorized", json!({ "error": "Invalid credentials" }))],
    );
    let (client, navigator) = client_at(&transport, "/en/login");

    let response = client
        .fetch_public::<Value>("/proxy/auth/login", FetchOptions::post())
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(response.body["error"], "Invalid credentials");
    assert_eq!(transport.calls(REFRESH), 0);
    assert!(navigator.redirects().is_empty());
}

// =============================================================================
// SESSION
// =============================================================================

#[tokio::test]
async fn get_session_returns_the_user() {
    let transport = MockTransport::new();
    transport.on(SESSION, [Reply::ok(json!({ "user": session_user() }))]);
    let (client, _) = client_at(&transport, "/en/feed");

    let user = client.get_session().await.unwrap().unwrap();
    assert_eq!(user.email, "ada@example.com");
}

#[tokio::test]
async fn anonymous_visitor_session_is_none_without_redirect() {
    let transport = MockTransport::new();
    transport.on(SESSION, [Reply::unauthorized()]).on(REFRESH, [Reply::missing_refresh_token()]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    assert_eq!(client.get_session().await.unwrap(), None);
    assert_eq!(transport.routes(), vec![SESSION, REFRESH]);
    assert!(navigator.redirects().is_empty());
}

#[tokio::test]
async fn null_session_body_is_none() {
    let transport = MockTransport::new();
    transport.on(SESSION, [Reply::ok(Value::Null)]);
    let (client, _) = client_at(&transport, "/en/feed");

    assert_eq!(client.get_session().await.unwrap(), None);
}

#[tokio::test]
async fn get_session_propagates_non_auth_errors() {
    let transport = MockTransport::new();
    transport.on(SESSION, [Reply::unreachable()]);
    let (client, _) = client_at(&transport, "/en/feed");

    let err = client.get_session().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn require_auth_redirects_anonymous_visitor() {
    let transport = MockTransport::new();
    transport.on(SESSION, [Reply::ok(json!({ "user": null }))]);
    let (client, navigator) = client_at(&transport, "/ar/feed");

    assert_eq!(client.require_auth(Locale::Ar).await.unwrap(), None);
    assert_eq!(navigator.redirects(), vec!["/ar/login"]);
}

#[tokio::test]
async fn require_auth_keeps_signed_in_visitor_in_place() {
    let transport = MockTransport::new();
    transport.on(SESSION, [Reply::ok(json!({ "user": session_user() }))]);
    let (client, navigator) = client_at(&transport, "/en/feed");

    assert!(client.require_auth(Locale::En).await.unwrap().is_some());
    assert!(navigator.redirects().is_empty());
}
