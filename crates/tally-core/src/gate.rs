//! Quota gate - admission control against the four calendar windows.
//!
//! The normal protocol is two calls: [`QuotaGate::check`] before the upstream
//! action and [`QuotaGate::increment`] after it succeeds. The pair is not
//! atomic, so concurrent callers may all pass `check` before any of them
//! increments. [`QuotaGate::try_acquire`] is the atomic variant for callers
//! that need a reservation instead of a permission.

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::Mutex;

use crate::domain::{Granularity, QuotaStatus, TierLimits, WindowStatus};
use crate::error::QuotaExceeded;
use crate::ports::{Clock, CounterStore};

pub struct QuotaGate {
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    limits: TierLimits,
    admission: Mutex<()>,
}

impl QuotaGate {
    pub fn new(store: Arc<dyn CounterStore>, clock: Arc<dyn Clock>, limits: TierLimits) -> Self {
        Self {
            store,
            clock,
            limits,
            admission: Mutex::new(()),
        }
    }

    pub fn limits(&self) -> TierLimits {
        self.limits
    }

    /// Fail on the first window (finest first) whose count has reached its limit.
    ///
    /// Never mutates counters.
    pub async fn check(&self, operation: &str) -> Result<(), QuotaExceeded> {
        let now = self.clock.now();

        for granularity in Granularity::ALL {
            let key = granularity.bucket_key(operation, now);
            let current = self.store.get(&key).await;
            let limit = self.limits.limit(granularity);

            if current >= limit {
                tracing::warn!(
                    operation,
                    window = %granularity,
                    current,
                    limit,
                    "Rate limit exceeded"
                );

                let retry_after = granularity.ttl();
                let reset_time = now
                    + TimeDelta::from_std(retry_after).unwrap_or_else(|_| TimeDelta::days(30));

                return Err(QuotaExceeded {
                    operation: operation.to_string(),
                    granularity,
                    limit,
                    current,
                    retry_after,
                    reset_time,
                });
            }
        }

        Ok(())
    }

    /// Count one action against every window, refreshing each window's TTL.
    pub async fn increment(&self, operation: &str) {
        let now = self.clock.now();

        for granularity in Granularity::ALL {
            let key = granularity.bucket_key(operation, now);
            self.store.increment(&key, granularity.ttl()).await;
        }

        tracing::info!(operation, "Rate limit incremented");
    }

    /// Check and increment as one step.
    ///
    /// Concurrent `try_acquire` calls are serialised, so they never
    /// over-admit against each other. Callers mixing this with the two-call
    /// protocol still race with those callers.
    pub async fn try_acquire(&self, operation: &str) -> Result<(), QuotaExceeded> {
        let _guard = self.admission.lock().await;
        self.check(operation).await?;
        self.increment(operation).await;
        Ok(())
    }

    /// Current usage of every window. Never mutates counters.
    pub async fn status(&self, operation: &str) -> QuotaStatus {
        let now = self.clock.now();

        let window = |granularity: Granularity| {
            let key = granularity.bucket_key(operation, now);
            let store = self.store.clone();
            let limit = self.limits.limit(granularity);
            async move {
                let current = store.get(&key).await;
                WindowStatus::new(current, limit, granularity.reset_instant(now))
            }
        };

        QuotaStatus {
            minute: window(Granularity::Minute).await,
            hour: window(Granularity::Hour).await,
            day: window(Granularity::Day).await,
            month: window(Granularity::Month).await,
        }
    }

    /// Flush every counter.
    pub async fn reset(&self) {
        self.store.clear().await;
        tracing::debug!("Quota counters flushed");
    }
}
