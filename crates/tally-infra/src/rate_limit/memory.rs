//! In-memory per-client rate limiter using governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use tally_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

type KeyedRateLimiter = GovernorRateLimiter<
    String,
    DefaultKeyedStateStore<String>,
    DefaultClock,
    StateInformationMiddleware,
>;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Keyed in-memory rate limiter using the GCRA algorithm.
///
/// Each key (usually a client IP) gets its own burst of `max_requests`,
/// replenished evenly across `window`.
/// Note: Limits are per-process, not distributed across instances.
pub struct InMemoryRateLimiter {
    limiter: KeyedRateLimiter,
    clock: DefaultClock,
    config: RateLimitConfig,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let burst = NonZeroU32::new(config.max_requests).ok_or_else(|| {
            RateLimitError::InvalidConfig("max_requests must be greater than zero".to_string())
        })?;
        let quota = Quota::with_period(config.window / config.max_requests)
            .ok_or_else(|| RateLimitError::InvalidConfig("window must be non-zero".to_string()))?
            .allow_burst(burst);

        let limiter = GovernorRateLimiter::keyed(quota).with_middleware::<StateInformationMiddleware>();

        Ok(Self {
            limiter,
            clock: DefaultClock::default(),
            config,
        })
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Forget keys whose state has fully replenished.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(snapshot) => Ok(RateLimitResult {
                allowed: true,
                remaining: snapshot.remaining_burst_capacity(),
                reset_after: self.config.window,
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(900),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_allows_burst_then_limits() {
        let limiter = limiter(3);

        for _ in 0..3 {
            let result = limiter.check("10.0.0.1").await.unwrap();
            assert!(result.allowed);
            assert!(result.remaining < 3);
        }

        let result = limiter.check("10.0.0.1").await.unwrap();
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
        assert!(result.reset_after > Duration::ZERO);
        assert!(result.reset_after <= Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1);

        assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(!limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(limiter.check("10.0.0.2").await.unwrap().allowed);
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_rejects_zero_requests() {
        let result = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        });
        assert!(matches!(result, Err(RateLimitError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 5,
            window: Duration::ZERO,
        });
        assert!(matches!(result, Err(RateLimitError::InvalidConfig(_))));
    }
}
