//! # Tally Infrastructure
//!
//! Concrete implementations of the ports defined in `tally-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `rate-limit` - Per-client inbound rate limiting via governor
//! - `x-api` - X (Twitter) v2 API publisher via reqwest

pub mod counter;
pub mod publisher;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use counter::InMemoryCounterStore;
pub use publisher::DryRunPublisher;

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "x-api")]
pub use publisher::{XApiConfig, XApiPublisher};
