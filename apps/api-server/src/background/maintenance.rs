//! Periodic housekeeping for the in-memory stores.

use tokio_cron_scheduler::JobSchedulerError;

use super::Scheduler;
use crate::state::AppState;

/// Drop expired quota counters and idle per-client limiter state.
///
/// Returns the number of counters removed.
pub async fn sweep(state: &AppState) -> usize {
    let purged = state.counters.purge_expired().await;

    #[cfg(feature = "rate-limit")]
    if let Some(limiter) = &state.ip_limiter {
        limiter.retain_recent();
    }

    if purged > 0 {
        tracing::debug!(purged, "Expired quota counters swept");
    }
    purged
}

/// Build a scheduler running [`sweep`] on `schedule` and start it.
pub async fn start_maintenance(
    state: AppState,
    schedule: &str,
    enabled: bool,
) -> Result<Scheduler, JobSchedulerError> {
    let mut scheduler = Scheduler::new(enabled).await?;

    scheduler
        .add_cron(schedule, move || {
            let state = state.clone();
            async move {
                sweep(&state).await;
            }
        })
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use tally_core::domain::Tier;
    use tally_core::ports::SystemClock;
    use tally_infra::DryRunPublisher;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_only_expired_windows() {
        let state = AppState::from_parts(
            Tier::Pro,
            Arc::new(SystemClock),
            Arc::new(DryRunPublisher::new()),
            "test".to_string(),
        );
        state.gate.increment("tweet").await;
        assert_eq!(state.counters.len().await, 4);

        assert_eq!(sweep(&state).await, 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(sweep(&state).await, 1);
        assert_eq!(state.counters.len().await, 3);
    }
}
