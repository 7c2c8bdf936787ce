//! Inbound rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Rate limiter trait - per-client throttling of incoming requests.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if a request from `key` is allowed and record it.
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError>;
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
