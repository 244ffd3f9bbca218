use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ForumError, ForumResult};
use crate::models::{Comment, CreateCommentInput, Envelope, Forum, Post};

/// Backend operations the thread view depends on.
#[async_trait]
pub trait ForumApi: Send + Sync {
    async fn get_post(&self, post_id: &str) -> ForumResult<Post>;
    async fn list_comments(&self, post_id: &str) -> ForumResult<Vec<Comment>>;
    async fn create_comment(&self, post_id: &str, input: &CreateCommentInput)
        -> ForumResult<Comment>;
    async fn like_post(&self, post_id: &str) -> ForumResult<()>;
    async fn unlike_post(&self, post_id: &str) -> ForumResult<()>;
    async fn like_comment(&self, comment_id: &str) -> ForumResult<()>;
    async fn unlike_comment(&self, comment_id: &str) -> ForumResult<()>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ForumResult<Self> {
        Self::with_options(base_url, None, Duration::from_secs(15))
    }

    pub fn from_config(config: &ClientConfig) -> ForumResult<Self> {
        Self::with_options(config.api_url.clone(), config.token.clone(), config.timeout())
    }

    pub fn with_options(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> ForumResult<Self> {
        let base_url = sanitize_base_url(base_url.into())?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.trim().is_empty());
    }

    pub async fn list_forums(&self) -> ForumResult<Vec<Forum>> {
        self.fetch("/forums").await
    }

    pub async fn list_forum_posts(&self, forum_id: &str) -> ForumResult<Vec<Post>> {
        self.fetch(&format!("/forums/{forum_id}/posts")).await
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> ForumResult<T> {
        let response = self.request(Method::GET, path)?.send().await?;
        let envelope: Envelope<T> = read_envelope(path, response).await?;
        envelope
            .data
            .ok_or_else(|| ForumError::MissingData(path.to_string()))
    }

    async fn mutate(&self, method: Method, path: &str) -> ForumResult<()> {
        let response = self.request(method, path)?.send().await?;
        let _: Envelope<serde_json::Value> = read_envelope(path, response).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> ForumResult<RequestBuilder> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let url = Url::parse(&raw).map_err(|_| ForumError::InvalidBaseUrl(raw.clone()))?;
        debug!(%method, %url, "forum api request");
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }
}

#[async_trait]
impl ForumApi for ApiClient {
    async fn get_post(&self, post_id: &str) -> ForumResult<Post> {
        self.fetch(&format!("/forums/posts/{post_id}")).await
    }

    async fn list_comments(&self, post_id: &str) -> ForumResult<Vec<Comment>> {
        self.fetch(&format!("/forums/posts/{post_id}/comments"))
            .await
    }

    async fn create_comment(
        &self,
        post_id: &str,
        input: &CreateCommentInput,
    ) -> ForumResult<Comment> {
        let path = format!("/forums/posts/{post_id}/comments");
        let response = self.request(Method::POST, &path)?.json(input).send().await?;
        let envelope: Envelope<Comment> = read_envelope(&path, response).await?;
        envelope.data.ok_or(ForumError::MissingData(path))
    }

    async fn like_post(&self, post_id: &str) -> ForumResult<()> {
        self.mutate(Method::POST, &format!("/forums/posts/{post_id}/like"))
            .await
    }

    async fn unlike_post(&self, post_id: &str) -> ForumResult<()> {
        self.mutate(Method::DELETE, &format!("/forums/posts/{post_id}/like"))
            .await
    }

    async fn like_comment(&self, comment_id: &str) -> ForumResult<()> {
        self.mutate(Method::POST, &format!("/forums/comments/{comment_id}/like"))
            .await
    }

    async fn unlike_comment(&self, comment_id: &str) -> ForumResult<()> {
        self.mutate(
            Method::DELETE,
            &format!("/forums/comments/{comment_id}/like"),
        )
        .await
    }
}

async fn read_envelope<T: DeserializeOwned>(
    path: &str,
    response: Response,
) -> ForumResult<Envelope<T>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or(body);
        debug!(path, %status, "forum api returned error status");
        return Err(ForumError::Status { status, message });
    }
    let envelope: Envelope<T> = response.json().await?;
    if !envelope.success {
        return Err(ForumError::Rejected(envelope.message.unwrap_or_default()));
    }
    Ok(envelope)
}

fn sanitize_base_url(mut base: String) -> ForumResult<String> {
    base = base.trim().to_string();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    Url::parse(&base).map_err(|_| ForumError::InvalidBaseUrl(base.clone()))?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_scheme_and_loses_trailing_slash() {
        let client = ApiClient::new("localhost:3000/api/").expect("client");
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn https_base_url_is_kept() {
        let client = ApiClient::new("https://lms.example.com").expect("client");
        assert_eq!(client.base_url(), "https://lms.example.com");
    }

    #[test]
    fn blank_token_is_dropped() {
        let client = ApiClient::with_options("localhost", Some("  ".into()), Duration::from_secs(1))
            .expect("client");
        assert!(client.token.is_none());
    }

    #[test]
    fn unparsable_base_url_is_rejected() {
        let err = ApiClient::new("http://[::1").err().expect("invalid url");
        assert!(matches!(err, ForumError::InvalidBaseUrl(_)));
    }
}
