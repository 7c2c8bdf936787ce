use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Granularity;

/// Live usage of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStatus {
    pub current: u64,
    pub limit: u64,
    pub remaining: u64,
    pub reset_time: DateTime<Utc>,
}

impl WindowStatus {
    pub fn new(current: u64, limit: u64, reset_time: DateTime<Utc>) -> Self {
        Self {
            current,
            limit,
            remaining: limit.saturating_sub(current),
            reset_time,
        }
    }
}

/// Usage snapshot across all four windows for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub minute: WindowStatus,
    pub hour: WindowStatus,
    pub day: WindowStatus,
    pub month: WindowStatus,
}

impl QuotaStatus {
    pub fn window(&self, granularity: Granularity) -> &WindowStatus {
        match granularity {
            Granularity::Minute => &self.minute,
            Granularity::Hour => &self.hour,
            Granularity::Day => &self.day,
            Granularity::Month => &self.month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_never_underflows() {
        let now = Utc::now();
        assert_eq!(WindowStatus::new(3, 10, now).remaining, 7);
        assert_eq!(WindowStatus::new(12, 10, now).remaining, 0);
        assert_eq!(WindowStatus::new(0, 0, now).remaining, 0);
    }
}
