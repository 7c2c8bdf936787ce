//! Posting port - the upstream social-media API.

use async_trait::async_trait;

use crate::domain::{AccountInfo, PostText, PublishedPost};

/// Publishes posts to the upstream API.
#[async_trait]
pub trait PostPublisher: Send + Sync {
    /// Publish a validated post.
    async fn publish(&self, text: &PostText) -> Result<PublishedPost, PublishError>;

    /// Fetch the account the publisher posts as.
    async fn account(&self) -> Result<AccountInfo, PublishError>;
}

/// Upstream posting errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    #[error("Upstream API rejected the credentials")]
    Unauthorized,

    #[error("Upstream API rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream API rejected the request: {0}")]
    Rejected(String),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Connection failed: {0}")]
    Connection(String),
}
