//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use tally_core::QuotaGate;
use tally_core::domain::Tier;
use tally_core::ports::{Clock, PostPublisher, RateLimiter, SystemClock};
use tally_infra::{DryRunPublisher, InMemoryCounterStore};

#[cfg(feature = "rate-limit")]
use tally_infra::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "x-api")]
use tally_infra::{XApiConfig, XApiPublisher};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<QuotaGate>,
    /// Same store the gate counts in, kept concrete for maintenance sweeps.
    #[cfg_attr(not(feature = "scheduler"), allow(dead_code))]
    pub counters: Arc<InMemoryCounterStore>,
    pub publisher: Arc<dyn PostPublisher>,
    pub tier: Tier,
    pub environment: String,
    pub started_at: Instant,
    #[cfg(feature = "rate-limit")]
    pub ip_limiter: Option<Arc<InMemoryRateLimiter>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub fn new(config: &AppConfig) -> Self {
        let state = Self::from_parts(
            config.tier,
            Arc::new(SystemClock),
            build_publisher(config),
            config.environment.clone(),
        );

        #[cfg(feature = "rate-limit")]
        let state = Self {
            ip_limiter: build_ip_limiter(config),
            ..state
        };

        tracing::info!(tier = %state.tier.as_str(), "Application state initialized");
        state
    }

    /// Assemble state from explicit parts. The inbound limiter starts disabled.
    pub fn from_parts(
        tier: Tier,
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn PostPublisher>,
        environment: String,
    ) -> Self {
        let counters = Arc::new(InMemoryCounterStore::new());
        let gate = QuotaGate::new(counters.clone(), clock, tier.limits());

        Self {
            gate: Arc::new(gate),
            counters,
            publisher,
            tier,
            environment,
            started_at: Instant::now(),
            #[cfg(feature = "rate-limit")]
            ip_limiter: None,
        }
    }

    /// Inbound limiter as a port, if one is configured.
    pub fn rate_limiter(&self) -> Option<Arc<dyn RateLimiter>> {
        #[cfg(feature = "rate-limit")]
        {
            self.ip_limiter
                .clone()
                .map(|limiter| limiter as Arc<dyn RateLimiter>)
        }

        #[cfg(not(feature = "rate-limit"))]
        {
            None
        }
    }
}

#[cfg(feature = "rate-limit")]
fn build_ip_limiter(config: &AppConfig) -> Option<Arc<InMemoryRateLimiter>> {
    let limit = RateLimitConfig {
        max_requests: config.rate_limit.max_requests,
        window: config.rate_limit.window,
    };

    match InMemoryRateLimiter::new(limit) {
        Ok(limiter) => Some(Arc::new(limiter)),
        Err(e) => {
            tracing::error!(error = %e, "Inbound rate limiter disabled");
            None
        }
    }
}

#[cfg(feature = "x-api")]
fn build_publisher(config: &AppConfig) -> Arc<dyn PostPublisher> {
    let Some(token) = config.upstream.bearer_token.clone() else {
        tracing::warn!("TWITTER_BEARER_TOKEN not set. Posts will be dry-run only.");
        return Arc::new(DryRunPublisher::new());
    };

    let client = XApiPublisher::new(XApiConfig {
        base_url: config.upstream.base_url.clone(),
        bearer_token: token,
        timeout: config.upstream.timeout,
    });

    match client {
        Ok(publisher) => Arc::new(publisher),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream client. Using dry-run publisher.");
            Arc::new(DryRunPublisher::new())
        }
    }
}

#[cfg(not(feature = "x-api"))]
fn build_publisher(_config: &AppConfig) -> Arc<dyn PostPublisher> {
    tracing::info!("Running without x-api feature - using dry-run publisher");
    Arc::new(DryRunPublisher::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_token_uses_tier_limits() {
        let config = AppConfig::from_lookup(|key| match key {
            "TWITTER_TIER" => Some("free".to_string()),
            _ => None,
        });
        let state = AppState::new(&config);

        assert_eq!(state.tier, Tier::Free);
        assert_eq!(state.gate.limits(), Tier::Free.limits());
        #[cfg(feature = "rate-limit")]
        assert!(state.rate_limiter().is_some());
    }
}
