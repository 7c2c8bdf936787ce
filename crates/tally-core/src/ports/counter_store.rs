use async_trait::async_trait;
use std::time::Duration;

/// Expiring counter store - every key carries its own time-to-live.
///
/// Operations never fail: an absent or expired key reads as zero.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current count for `key`, or 0 if absent or expired.
    async fn get(&self, key: &str) -> u64;

    /// Overwrite `key` and reset its expiry to `ttl` from now.
    async fn set(&self, key: &str, value: u64, ttl: Duration);

    /// Add one to `key` (starting from 0 if absent or expired), reset its
    /// expiry to `ttl` from now and return the new count.
    ///
    /// Read and write happen under one lock, so concurrent increments are
    /// never lost.
    async fn increment(&self, key: &str, ttl: Duration) -> u64;

    /// Drop every entry.
    async fn clear(&self);
}
