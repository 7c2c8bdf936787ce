//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tally_core::domain::Tier;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment, reported by the health check.
    pub environment: String,
    /// Upstream API tier selecting the quota ceilings.
    pub tier: Tier,
    #[cfg_attr(not(feature = "x-api"), allow(dead_code))]
    pub upstream: UpstreamConfig,
    #[cfg_attr(not(feature = "rate-limit"), allow(dead_code))]
    pub rate_limit: InboundRateLimit,
    /// Key the inbound limiter on forwarded client IPs. Enable only behind a
    /// proxy that overwrites `X-Forwarded-For`.
    pub trust_proxy: bool,
    /// Cron expression for the expired-counter sweep.
    #[cfg_attr(not(feature = "scheduler"), allow(dead_code))]
    pub sweep_cron: String,
    #[cfg_attr(not(feature = "scheduler"), allow(dead_code))]
    pub scheduler_enabled: bool,
    pub json_body_limit: usize,
}

/// Upstream posting API settings.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "x-api"), allow(dead_code))]
pub struct UpstreamConfig {
    pub base_url: String,
    /// OAuth 2.0 user-context token. Without it posts are only dry-run.
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

/// Per-client inbound request limit.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "rate-limit"), allow(dead_code))]
pub struct InboundRateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tier = match lookup("TWITTER_TIER") {
            Some(name) => Tier::parse(&name).unwrap_or_else(|| {
                tracing::warn!(tier = %name, "Unknown TWITTER_TIER, falling back to basic");
                Tier::Basic
            }),
            None => Tier::default(),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            tier,
            upstream: UpstreamConfig {
                base_url: lookup("TWITTER_API_BASE_URL")
                    .unwrap_or_else(|| "https://api.twitter.com".to_string()),
                bearer_token: lookup("TWITTER_BEARER_TOKEN").filter(|t| !t.trim().is_empty()),
                timeout: Duration::from_secs(parse_or(&lookup, "TWITTER_TIMEOUT_SECS", 10)),
            },
            rate_limit: InboundRateLimit {
                max_requests: parse_or(&lookup, "RATE_LIMIT_MAX_REQUESTS", 10),
                window: Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 900)),
            },
            trust_proxy: lookup("TRUST_PROXY")
                .map(|v| matches!(v.trim(), "true" | "1"))
                .unwrap_or(false),
            sweep_cron: lookup("COUNTER_SWEEP_CRON").unwrap_or_else(|| "0 * * * * *".to_string()),
            scheduler_enabled: lookup("SCHEDULER_ENABLED")
                .map(|v| !matches!(v.trim(), "false" | "0"))
                .unwrap_or(true),
            json_body_limit: parse_or(&lookup, "JSON_BODY_LIMIT_BYTES", 10 * 1024 * 1024),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}
