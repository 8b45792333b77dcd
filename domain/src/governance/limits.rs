//! Rate and cost limits

use serde::{Deserialize, Serialize};

/// Throughput and spend limits enforced by the governor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
    pub user_per_minute: u32,
    pub user_per_hour: u32,
    pub agent_per_minute: u32,
    pub global_per_minute: u32,
    /// Dollars a single user may spend in any rolling hour.
    pub user_hourly_cost_cap: f64,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            user_per_minute: 10,
            user_per_hour: 100,
            agent_per_minute: 20,
            global_per_minute: 500,
            user_hourly_cost_cap: 5.0,
        }
    }
}

impl RateLimits {
    pub fn with_user_per_minute(mut self, limit: u32) -> Self {
        self.user_per_minute = limit;
        self
    }

    pub fn with_user_per_hour(mut self, limit: u32) -> Self {
        self.user_per_hour = limit;
        self
    }

    pub fn with_agent_per_minute(mut self, limit: u32) -> Self {
        self.agent_per_minute = limit;
        self
    }

    pub fn with_global_per_minute(mut self, limit: u32) -> Self {
        self.global_per_minute = limit;
        self
    }

    pub fn with_user_hourly_cost_cap(mut self, cap: f64) -> Self {
        self.user_hourly_cost_cap = cap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = RateLimits::default();
        assert_eq!(limits.user_per_minute, 10);
        assert_eq!(limits.user_per_hour, 100);
        assert_eq!(limits.agent_per_minute, 20);
        assert_eq!(limits.global_per_minute, 500);
        assert_eq!(limits.user_hourly_cost_cap, 5.0);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let limits: RateLimits = serde_json::from_str(r#"{"user_per_minute": 3}"#).unwrap();
        assert_eq!(limits.user_per_minute, 3);
        assert_eq!(limits.user_per_hour, 100);
    }
}
