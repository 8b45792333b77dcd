//! Subscription tiers and monthly quota keys
//!
//! Quota counters are keyed by `(user, tier, year-month)`. A new month means a
//! new key, so usage resets at rollover without any scheduled job.

use super::value_objects::UserId;
use crate::core::error::DomainError;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Subscription level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Basic,
    Essential,
    Premium,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Essential, Tier::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Essential => "essential",
            Tier::Premium => "premium",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "essential" => Ok(Tier::Essential),
            "premium" => Ok(Tier::Premium),
            other => Err(DomainError::InvalidTier(other.to_string())),
        }
    }
}

/// Quota and compute allocation of one tier.
///
/// `compute_profile` is passed through to the reasoning service to choose
/// hardware; it is never enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierQuota {
    pub tier: Tier,
    pub monthly_limit: u64,
    pub compute_units: f64,
    pub compute_profile: String,
}

impl TierQuota {
    /// Built-in allocation: basic 250/1, essential 600/2, premium 1500/2.5.
    pub fn default_for(tier: Tier) -> Self {
        let (monthly_limit, compute_units, compute_profile) = match tier {
            Tier::Basic => (250, 1.0, "shared-cpu"),
            Tier::Essential => (600, 2.0, "standard-gpu"),
            Tier::Premium => (1500, 2.5, "dedicated-gpu"),
        };
        Self {
            tier,
            monthly_limit,
            compute_units,
            compute_profile: compute_profile.to_string(),
        }
    }
}

/// Quota position of a user for the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub tier: Tier,
    pub allowed: bool,
    pub used: u64,
    pub limit: u64,
    /// Unix seconds at which the month rolls over (UTC).
    pub reset_epoch: i64,
    pub compute_profile: String,
}

impl QuotaStatus {
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}

fn utc(now_ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_default()
}

/// Calendar month of `now_ms` as `YYYY-MM` (UTC).
pub fn month_key(now_ms: i64) -> String {
    let now = utc(now_ms);
    format!("{:04}-{:02}", now.year(), now.month())
}

/// Counter key for a user's usage of a tier in the month of `now_ms`.
pub fn quota_key(user: &UserId, tier: Tier, now_ms: i64) -> String {
    format!("quota:{}:{}:{}", user, tier, month_key(now_ms))
}

/// Unix seconds of the first instant of the month after `now_ms` (UTC).
pub fn month_reset_epoch(now_ms: i64) -> i64 {
    let now = utc(now_ms);
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| now.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_default_tiers() {
        assert_eq!(TierQuota::default_for(Tier::Basic).monthly_limit, 250);
        assert_eq!(TierQuota::default_for(Tier::Essential).monthly_limit, 600);
        let premium = TierQuota::default_for(Tier::Premium);
        assert_eq!(premium.monthly_limit, 1500);
        assert_eq!(premium.compute_units, 2.5);
    }

    #[test]
    fn test_key_changes_at_month_rollover() {
        let user = UserId::new("alice");
        let last_second = millis(2026, 1, 31, 23, 59, 59);
        let first_second = millis(2026, 2, 1, 0, 0, 0);
        assert_eq!(quota_key(&user, Tier::Basic, last_second), "quota:alice:basic:2026-01");
        assert_eq!(quota_key(&user, Tier::Basic, first_second), "quota:alice:basic:2026-02");
    }

    #[test]
    fn test_reset_epoch_is_next_month_start() {
        let mid_month = millis(2026, 10, 16, 12, 0, 0);
        assert_eq!(month_reset_epoch(mid_month), millis(2026, 11, 1, 0, 0, 0) / 1000);
    }

    #[test]
    fn test_reset_epoch_wraps_year() {
        let december = millis(2026, 12, 31, 23, 0, 0);
        assert_eq!(month_reset_epoch(december), millis(2027, 1, 1, 0, 0, 0) / 1000);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("Premium".parse::<Tier>().unwrap(), Tier::Premium);
        assert!(matches!("gold".parse::<Tier>(), Err(DomainError::InvalidTier(_))));
    }
}
