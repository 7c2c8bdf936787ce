use serde::{Deserialize, Serialize};

use super::Granularity;

/// Upstream API access tier - selects the quota ceilings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    #[default]
    Basic,
    Pro,
}

impl Tier {
    /// Parse a tier name, case-insensitively. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Tier::Free),
            "basic" => Some(Tier::Basic),
            "pro" => Some(Tier::Pro),
            _ => None,
        }
    }

    /// Resolve a tier name, falling back to [`Tier::Basic`] for unknown names.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Basic => "basic",
            Tier::Pro => "pro",
        }
    }

    pub fn limits(&self) -> TierLimits {
        match self {
            Tier::Free => TierLimits {
                per_minute: 1,
                per_hour: 2,
                per_day: 50,
                per_month: 1_500,
            },
            // ~50000/30 per day, ~1667/24 per hour
            Tier::Basic => TierLimits {
                per_minute: 1,
                per_hour: 69,
                per_day: 1_667,
                per_month: 50_000,
            },
            Tier::Pro => TierLimits {
                per_minute: 23,
                per_hour: 1_388,
                per_day: 33_333,
                per_month: 1_000_000,
            },
        }
    }
}

/// Quota ceilings for each window. A ceiling of 0 blocks every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    pub per_minute: u64,
    pub per_hour: u64,
    pub per_day: u64,
    pub per_month: u64,
}

impl TierLimits {
    /// Ceilings for a configured tier name; unknown names get the basic tier.
    pub fn for_tier(name: &str) -> Self {
        Tier::from_name(name).limits()
    }

    pub fn limit(&self, granularity: Granularity) -> u64 {
        match granularity {
            Granularity::Minute => self.per_minute,
            Granularity::Hour => self.per_hour,
            Granularity::Day => self.per_day,
            Granularity::Month => self.per_month,
        }
    }
}
