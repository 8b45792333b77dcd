//! Governance configuration from TOML (`[governance]` and `[quota]` sections)

use conclave_domain::{ConfigIssue, ConfigIssueCode, RateLimits, Tier, TierQuota};
use serde::{Deserialize, Serialize};

/// `[governance]`: sliding window limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGovernanceConfig {
    /// Requests per user per minute (default: 10)
    pub user_per_minute: u32,
    /// Requests per user per hour (default: 100)
    pub user_per_hour: u32,
    /// Calls per agent per minute (default: 20)
    pub agent_per_minute: u32,
    /// Requests across all users per minute (default: 500)
    pub global_per_minute: u32,
    /// Dollars per user per rolling hour (default: 5.00)
    pub user_hourly_cost_cap: f64,
}

impl Default for FileGovernanceConfig {
    fn default() -> Self {
        let limits = RateLimits::default();
        Self {
            user_per_minute: limits.user_per_minute,
            user_per_hour: limits.user_per_hour,
            agent_per_minute: limits.agent_per_minute,
            global_per_minute: limits.global_per_minute,
            user_hourly_cost_cap: limits.user_hourly_cost_cap,
        }
    }
}

impl FileGovernanceConfig {
    pub fn to_rate_limits(&self) -> RateLimits {
        RateLimits::default()
            .with_user_per_minute(self.user_per_minute)
            .with_user_per_hour(self.user_per_hour)
            .with_agent_per_minute(self.agent_per_minute)
            .with_global_per_minute(self.global_per_minute)
            .with_user_hourly_cost_cap(self.user_hourly_cost_cap)
    }

    pub(super) fn issues(&self) -> Vec<ConfigIssue> {
        let counts = [
            ("governance.user_per_minute", self.user_per_minute),
            ("governance.user_per_hour", self.user_per_hour),
            ("governance.agent_per_minute", self.agent_per_minute),
            ("governance.global_per_minute", self.global_per_minute),
        ];
        let mut issues: Vec<ConfigIssue> = counts
            .into_iter()
            .filter(|(_, value)| *value == 0)
            .map(|(field, _)| non_positive(field))
            .collect();
        if self.user_hourly_cost_cap <= 0.0 || self.user_hourly_cost_cap.is_nan() {
            issues.push(non_positive("governance.user_hourly_cost_cap"));
        }
        issues
    }
}

/// Override of one tier's allocation. Unset fields keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTierQuotaConfig {
    pub monthly_limit: Option<u64>,
    pub compute_units: Option<f64>,
    pub compute_profile: Option<String>,
}

impl FileTierQuotaConfig {
    fn apply(&self, tier: Tier) -> TierQuota {
        let mut quota = TierQuota::default_for(tier);
        if let Some(limit) = self.monthly_limit {
            quota.monthly_limit = limit;
        }
        if let Some(units) = self.compute_units {
            quota.compute_units = units;
        }
        if let Some(profile) = &self.compute_profile {
            quota.compute_profile = profile.clone();
        }
        quota
    }
}

/// `[quota]`: per-tier overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQuotaConfig {
    pub basic: FileTierQuotaConfig,
    pub essential: FileTierQuotaConfig,
    pub premium: FileTierQuotaConfig,
}

impl FileQuotaConfig {
    fn for_tier(&self, tier: Tier) -> &FileTierQuotaConfig {
        match tier {
            Tier::Basic => &self.basic,
            Tier::Essential => &self.essential,
            Tier::Premium => &self.premium,
        }
    }

    /// Effective allocation of every tier.
    pub fn tier_quotas(&self) -> Vec<TierQuota> {
        Tier::ALL
            .iter()
            .map(|tier| self.for_tier(*tier).apply(*tier))
            .collect()
    }

    pub(super) fn issues(&self) -> Vec<ConfigIssue> {
        Tier::ALL
            .iter()
            .filter(|tier| self.for_tier(**tier).monthly_limit == Some(0))
            .map(|tier| non_positive(&format!("quota.{}.monthly_limit", tier)))
            .collect()
    }
}

fn non_positive(field: &str) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::NonPositiveLimit {
            field: field.to_string(),
        },
        format!("{}: must be greater than zero", field),
    )
}
