//! Domain-level error types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::Granularity;

/// A quota window is full. Always recoverable by retrying later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Rate limit exceeded for {} {operation} operations", .granularity.adverb())]
pub struct QuotaExceeded {
    pub operation: String,
    pub granularity: Granularity,
    pub limit: u64,
    pub current: u64,
    /// The window's full time-to-live, not the distance to its calendar boundary.
    pub retry_after: Duration,
    pub reset_time: DateTime<Utc>,
}

impl QuotaExceeded {
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after.as_secs()
    }
}
