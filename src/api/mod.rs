//! Client for the blogging HTTP API.
//!
//! [`PostApi`] is the seam the controllers talk to; [`HttpPostApi`] is the
//! reqwest-backed implementation used in production.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::constants::CLIENT_USER_AGENT;
use crate::models::{DraftPost, LoginRequest, Post, PostPage, RegisterRequest};
use crate::session::Session;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// Error message supplied by the server, if the failure carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Error body shape used by the API (`{"message": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Operations offered by the blogging API.
#[async_trait]
pub trait PostApi: Send + Sync {
    /// Fetch one page of posts.
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<PostPage, ApiError>;

    /// Create a post on behalf of the bearer of `token`.
    async fn create_post(&self, draft: &DraftPost, token: &str) -> Result<Post, ApiError>;

    /// Register a new account. Only the status is meaningful.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    /// Sign in and return the user record holding the session token.
    async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError>;
}

/// reqwest implementation of [`PostApi`].
#[derive(Clone)]
pub struct HttpPostApi {
    http: Client,
    base_url: String,
}

impl HttpPostApi {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(CLIENT_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-success response into [`ApiError::Status`].
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .and_then(|body| body.message);

    Err(ApiError::Status { status, message })
}

#[async_trait]
impl PostApi for HttpPostApi {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<PostPage, ApiError> {
        let url = self.endpoint(&format!("/api/posts?page={page}&limit={limit}"));
        debug!(url = %url, "Fetching posts page");

        let response = self.http.get(&url).send().await?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::Decode)
    }

    async fn create_post(&self, draft: &DraftPost, token: &str) -> Result<Post, ApiError> {
        let url = self.endpoint("/api/posts");
        debug!(url = %url, title = %draft.title, "Creating post");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(draft)
            .send()
            .await?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::Decode)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let url = self.endpoint("/api/register");
        debug!(url = %url, username = %request.username, "Registering user");

        let response = self.http.post(&url).json(request).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        let url = self.endpoint("/api/login");
        debug!(url = %url, email = %request.email, "Signing in");

        let response = self.http.post(&url).json(request).send().await?;
        check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::Decode)
    }
}
