//! Orchestration configuration from TOML (`[orchestration]` section)

use conclave_application::OrchestrationParams;
use conclave_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    /// Maximum nesting of consultations (default: 2)
    pub max_consultation_depth: u8,
    /// Timeout of each outbound reasoning call in seconds (default: 60)
    pub call_timeout_secs: u64,
    /// Agents running at once in parallel/ensemble (default: 4)
    pub max_concurrency: usize,
    /// Memory entries included in each prompt (default: 3)
    pub memory_entries: usize,
    /// Threshold used when a request sets none (default: 0.8)
    pub default_quality_threshold: f64,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        let params = OrchestrationParams::default();
        Self {
            max_consultation_depth: params.max_consultation_depth,
            call_timeout_secs: params.call_timeout.as_secs(),
            max_concurrency: params.max_concurrency,
            memory_entries: params.memory_entries,
            default_quality_threshold: params.default_quality_threshold,
        }
    }
}

impl FileOrchestrationConfig {
    pub fn to_params(&self) -> OrchestrationParams {
        OrchestrationParams::default()
            .with_max_consultation_depth(self.max_consultation_depth)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
            .with_max_concurrency(self.max_concurrency)
            .with_memory_entries(self.memory_entries)
            .with_default_quality_threshold(self.default_quality_threshold)
    }

    pub(super) fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_concurrency == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NonPositiveLimit {
                    field: "orchestration.max_concurrency".to_string(),
                },
                "orchestration.max_concurrency: must be at least 1",
            ));
        }
        if self.call_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NonPositiveLimit {
                    field: "orchestration.call_timeout_secs".to_string(),
                },
                "orchestration.call_timeout_secs: must be greater than zero",
            ));
        }
        if !(0.0..=1.0).contains(&self.default_quality_threshold) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange {
                    field: "orchestration.default_quality_threshold".to_string(),
                },
                format!(
                    "orchestration.default_quality_threshold: {} is outside [0, 1]",
                    self.default_quality_threshold
                ),
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_params() {
        let config = FileOrchestrationConfig::default();
        assert_eq!(config.to_params(), OrchestrationParams::default());
        assert!(config.issues().is_empty());
    }

    #[test]
    fn test_partial_section() {
        let config: FileOrchestrationConfig = toml::from_str("call_timeout_secs = 5").unwrap();
        let params = config.to_params();
        assert_eq!(params.call_timeout, Duration::from_secs(5));
        assert_eq!(params.max_consultation_depth, 2);
    }

    #[test]
    fn test_invalid_values() {
        let config = FileOrchestrationConfig {
            max_concurrency: 0,
            default_quality_threshold: 1.5,
            ..Default::default()
        };
        let issues = config.issues();
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            issues[1].code,
            ConfigIssueCode::ThresholdOutOfRange { .. }
        ));
    }
}
