//! One helper per gateway route.
//!
//! Typed helpers decode the body as [`ApiBody<T>`] so a non-2xx error body
//! still decodes. Routes whose bodies no caller inspects are left as raw
//! JSON.

use envelope::{
    ApiBody, BackendResponse, CreatePostRequest, CreateReplyRequest, FollowRequest, LikeRequest, LoginRequest,
    PostResponse, PostsResponse, RegisterRequest, UserPostsResponse, UsersResponse,
};
use serde_json::Value;

use super::api::{ApiClient, FetchOptions};
use super::error::ApiError;

type Envelope<T = Value> = Result<BackendResponse<T>, ApiError>;

impl ApiClient {
    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Transport or decode failures. Wrong credentials come back as a 401 envelope.
    pub async fn login(&self, request: &LoginRequest) -> Envelope {
        let path = self.config().path("auth/login");
        self.fetch_public(&path, FetchOptions::post().json(request)?).await
    }

    /// # Errors
    ///
    /// Transport or decode failures.
    pub async fn register(&self, request: &RegisterRequest) -> Envelope {
        let path = self.config().path("auth/register");
        self.fetch_public(&path, FetchOptions::post().json(request)?).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn logout(&self) -> Envelope {
        let path = self.config().path("auth/logout");
        self.fetch(&path, FetchOptions::post()).await
    }

    // -------------------------------------------------------------------------
    // Posts
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn posts(&self) -> Envelope<ApiBody<PostsResponse>> {
        self.fetch(&self.config().path("posts"), FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn create_post(&self, request: &CreatePostRequest) -> Envelope<ApiBody<PostResponse>> {
        let path = self.config().path("posts");
        self.fetch(&path, FetchOptions::post().json(request)?).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::fetch`]; [`ApiError::InvalidUrl`] for an empty or dot id.
    pub async fn post(&self, post_id: &str) -> Envelope<ApiBody<PostResponse>> {
        let path = self.config().endpoint("posts", &[post_id])?;
        self.fetch(&path, FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn delete_post(&self, post_id: &str) -> Envelope {
        let path = self.config().endpoint("posts", &[post_id])?;
        self.fetch(&path, FetchOptions::delete()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn replies(&self, post_id: &str) -> Envelope {
        let path = self.config().endpoint("posts", &[post_id, "replies"])?;
        self.fetch(&path, FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn create_reply(&self, post_id: &str, request: &CreateReplyRequest) -> Envelope {
        let path = self.config().endpoint("posts", &[post_id, "replies"])?;
        self.fetch(&path, FetchOptions::post().json(request)?).await
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn users(&self) -> Envelope<ApiBody<UsersResponse>> {
        self.fetch(&self.config().path("users"), FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn user_posts(&self, user_id: &str) -> Envelope<ApiBody<UserPostsResponse>> {
        let path = self.config().endpoint("users", &[user_id, "posts"])?;
        self.fetch(&path, FetchOptions::get()).await
    }

    // -------------------------------------------------------------------------
    // Follows
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn follow(&self, user_id: &str) -> Envelope {
        let body = FollowRequest { user_id: user_id.to_owned() };
        let path = self.config().path("follows");
        self.fetch(&path, FetchOptions::post().json(&body)?).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn unfollow(&self, user_id: &str) -> Envelope {
        let path = self.config().endpoint("follows", &[user_id])?;
        self.fetch(&path, FetchOptions::delete()).await
    }

    /// Users the current user follows.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn following(&self) -> Envelope {
        self.fetch(&self.config().path("follows/following"), FetchOptions::get()).await
    }

    /// Feed of posts by followed users.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn following_posts(&self) -> Envelope {
        self.fetch(&self.config().path("follows/following/posts"), FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn following_of(&self, user_id: &str) -> Envelope {
        let path = self.config().endpoint("follows/following", &[user_id])?;
        self.fetch(&path, FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn followers(&self) -> Envelope {
        self.fetch(&self.config().path("follows/followers"), FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn followers_of(&self, user_id: &str) -> Envelope {
        let path = self.config().endpoint("follows/followers", &[user_id])?;
        self.fetch(&path, FetchOptions::get()).await
    }

    // -------------------------------------------------------------------------
    // Likes
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn like(&self, post_id: &str) -> Envelope {
        let body = LikeRequest { post_id: post_id.to_owned() };
        let path = self.config().path("likes");
        self.fetch(&path, FetchOptions::post().json(&body)?).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn unlike(&self, post_id: &str) -> Envelope {
        let path = self.config().endpoint("likes", &[post_id])?;
        self.fetch(&path, FetchOptions::delete()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn is_liked(&self, post_id: &str) -> Envelope {
        let path = self.config().endpoint("likes/check", &[post_id])?;
        self.fetch(&path, FetchOptions::get()).await
    }

    /// Users who liked `post_id`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn likers(&self, post_id: &str) -> Envelope {
        let path = self.config().endpoint("likes/post", &[post_id])?;
        self.fetch(&path, FetchOptions::get()).await
    }

    /// Posts the current user liked.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::fetch`].
    pub async fn liked(&self) -> Envelope {
        self.fetch(&self.config().path("likes/user"), FetchOptions::get()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn liked_by(&self, user_id: &str) -> Envelope {
        let path = self.config().endpoint("likes/user", &[user_id])?;
        self.fetch(&path, FetchOptions::get()).await
    }
}

#[cfg(test)]
#[path = "endpoints_test.rs"]
mod endpoints_test;
