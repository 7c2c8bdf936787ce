//! X (Twitter) v2 API publisher.
//!
//! Authenticates with an OAuth 2.0 user-context bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use tally_core::domain::{AccountInfo, PostText, PublishedPost};
use tally_core::ports::{PostPublisher, PublishError};

/// Retry hint used when the upstream does not send a usable reset header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 900;

/// X API client configuration.
#[derive(Debug, Clone)]
pub struct XApiConfig {
    pub base_url: String,
    pub bearer_token: String,
    pub timeout: Duration,
}

impl Default for XApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com".to_string(),
            bearer_token: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct XApiPublisher {
    config: XApiConfig,
    client: Client,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct CreatedPost {
    id: String,
    text: String,
}

#[derive(Deserialize)]
struct UpstreamProblem {
    detail: Option<String>,
    title: Option<String>,
}

impl XApiPublisher {
    pub fn new(config: XApiConfig) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        tracing::info!(base_url = %config.base_url, "X API client initialized");

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn into_error(response: Response) -> PublishError {
        let status = response.status();
        let retry_after_secs = retry_after_from(response.headers());
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => PublishError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => PublishError::RateLimited { retry_after_secs },
            StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
                PublishError::Rejected(problem_detail(&body))
            }
            _ => PublishError::Upstream(format!("{}: {}", status, problem_detail(&body))),
        }
    }
}

/// Seconds until the upstream window resets, from the `x-rate-limit-reset`
/// epoch timestamp.
fn retry_after_from(headers: &HeaderMap) -> u64 {
    headers
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|reset| (reset - chrono::Utc::now().timestamp()).max(1) as u64)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn problem_detail(body: &str) -> String {
    match serde_json::from_str::<UpstreamProblem>(body) {
        Ok(UpstreamProblem {
            detail: Some(detail),
            ..
        }) => detail,
        Ok(UpstreamProblem {
            title: Some(title), ..
        }) => title,
        _ if body.is_empty() => "no details".to_string(),
        _ => body.to_string(),
    }
}

#[async_trait]
impl PostPublisher for XApiPublisher {
    async fn publish(&self, text: &PostText) -> Result<PublishedPost, PublishError> {
        tracing::info!(
            text_length = text.char_count(),
            preview = %text.preview(),
            "Attempting to publish post"
        );

        let response = self
            .client
            .post(self.url("/2/tweets"))
            .bearer_auth(&self.config.bearer_token)
            .json(&json!({ "text": text.as_str() }))
            .send()
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::into_error(response).await;
            tracing::error!(error = %err, "Error publishing post");
            return Err(err);
        }

        let created: Envelope<CreatedPost> = response
            .json()
            .await
            .map_err(|e| PublishError::Upstream(format!("Malformed response: {}", e)))?;

        tracing::info!(post_id = %created.data.id, "Post published successfully");

        Ok(PublishedPost {
            id: created.data.id,
            text: created.data.text,
            created_at: chrono::Utc::now(),
        })
    }

    async fn account(&self) -> Result<AccountInfo, PublishError> {
        let response = self
            .client
            .get(self.url("/2/users/me"))
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::into_error(response).await;
            tracing::error!(error = %err, "Error getting account info");
            return Err(err);
        }

        let me: Envelope<AccountInfo> = response
            .json()
            .await
            .map_err(|e| PublishError::Upstream(format!("Malformed response: {}", e)))?;

        Ok(me.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> XApiPublisher {
        XApiPublisher::new(XApiConfig {
            base_url: server.uri(),
            bearer_token: "test-token".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn text(raw: &str) -> PostText {
        PostText::parse(Some(&json!(raw))).unwrap()
    }

    #[tokio::test]
    async fn test_publish_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({ "text": "hello world" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": { "id": "1445880548472328192", "text": "hello world" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let post = publisher(&server).publish(&text("hello world")).await.unwrap();
        assert_eq!(post.id, "1445880548472328192");
        assert_eq!(post.text, "hello world");
    }

    #[tokio::test]
    async fn test_publish_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "title": "Unauthorized", "status": 401, "detail": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let err = publisher(&server).publish(&text("hello")).await.unwrap_err();
        assert!(matches!(err, PublishError::Unauthorized));
    }

    #[tokio::test]
    async fn test_publish_rate_limited_uses_reset_header() {
        let server = MockServer::start().await;
        let reset = chrono::Utc::now().timestamp() + 120;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("x-rate-limit-reset", reset.to_string()),
            )
            .mount(&server)
            .await;

        let err = publisher(&server).publish(&text("hello")).await.unwrap_err();
        match err {
            PublishError::RateLimited { retry_after_secs } => {
                assert!((110..=120).contains(&retry_after_secs))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_rate_limited_without_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = publisher(&server).publish(&text("hello")).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::RateLimited {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS
            }
        ));
    }

    #[tokio::test]
    async fn test_publish_rejected_carries_upstream_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "title": "Forbidden",
                "detail": "You are not allowed to create a Tweet with duplicate content."
            })))
            .mount(&server)
            .await;

        let err = publisher(&server).publish(&text("hello")).await.unwrap_err();
        match err {
            PublishError::Rejected(detail) => assert!(detail.contains("duplicate content")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let err = publisher(&server).publish(&text("hello")).await.unwrap_err();
        assert!(matches!(err, PublishError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": "2244994945", "name": "Tally Bot", "username": "tallybot" }
            })))
            .mount(&server)
            .await;

        let account = publisher(&server).account().await.unwrap();
        assert_eq!(account.id, "2244994945");
        assert_eq!(account.username, "tallybot");
        assert_eq!(account.name, "Tally Bot");
    }

    #[test]
    fn test_problem_detail_fallbacks() {
        assert_eq!(problem_detail(r#"{"detail":"bad"}"#), "bad");
        assert_eq!(problem_detail(r#"{"title":"Forbidden"}"#), "Forbidden");
        assert_eq!(problem_detail("plain text"), "plain text");
        assert_eq!(problem_detail(""), "no details");
    }
}
