//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to publish a post.
///
/// `text` is kept as a raw JSON value so a non-string payload can be reported
/// as a validation error rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub text: Option<Value>,
}

/// A published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub text: String,
    pub created_at: String,
}

/// Usage of one quota window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowUsage {
    pub current: u64,
    pub limit: u64,
    pub remaining: u64,
    pub reset_time: String,
}

/// Usage of every quota window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaLimits {
    pub minute: WindowUsage,
    pub hour: WindowUsage,
    pub day: WindowUsage,
    pub month: WindowUsage,
}

/// Quota status for the configured tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitStatusResponse {
    pub tier: String,
    pub limits: QuotaLimits,
}

/// The upstream account posts are published as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub name: String,
}
