//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types where those exist.

mod agents;
mod gateway;
mod governance;
mod orchestration;
mod output;

pub use agents::{FileAgentConfig, FileAgentsConfig, FileCollaborationHint};
pub use gateway::{DEFAULT_API_KEY_ENV, FileGatewayConfig};
pub use governance::{FileGovernanceConfig, FileQuotaConfig, FileTierQuotaConfig};
pub use orchestration::FileOrchestrationConfig;
pub use output::{FileLoggingConfig, FileOutputConfig, FileStorageConfig};

use conclave_domain::{AgentId, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Rate and cost limits
    pub governance: FileGovernanceConfig,
    /// Per-tier monthly quota overrides
    pub quota: FileQuotaConfig,
    /// Consultation depth, timeouts and fan-out
    pub orchestration: FileOrchestrationConfig,
    /// Reasoning service connection
    pub gateway: FileGatewayConfig,
    /// Per-agent overrides keyed by agent id
    pub agents: FileAgentsConfig,
    /// Strategic directives added to every prompt
    pub directives: Vec<String>,
    /// Shared governance store
    pub storage: FileStorageConfig,
    /// Conversation log
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// `known_agents` are the registered agent ids; `[agents.<id>]` sections
    /// for anything else are reported as warnings.
    pub fn validate(&self, known_agents: &[AgentId]) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.governance.issues());
        issues.extend(self.quota.issues());
        issues.extend(self.orchestration.issues());

        for id in agents::agent_ids(&self.agents) {
            if !known_agents.contains(&id) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownAgent {
                        id: id.to_string(),
                    },
                    format!("agents.{}: no such agent, section ignored", id),
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::AgentRegistry;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
directives = ["Prefer concrete numbers"]

[governance]
user_per_minute = 5
user_hourly_cost_cap = 2.5

[quota.basic]
monthly_limit = 100

[orchestration]
max_consultation_depth = 1

[gateway]
base_url = "http://localhost:11434/v1"
default_model = "llama3"

[agents.analyst]
model = "gpt-4o"
memory = ["reviewed Q3 numbers"]

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.governance.user_per_minute, 5);
        assert_eq!(config.governance.user_per_hour, 100);
        assert_eq!(config.quota.basic.monthly_limit, Some(100));
        assert_eq!(config.orchestration.max_consultation_depth, 1);
        assert_eq!(config.gateway.default_model, "llama3");
        assert_eq!(config.agents["analyst"].model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.directives, vec!["Prefer concrete numbers"]);
        assert!(!config.output.color);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.agents.is_empty());
        assert!(config.directives.is_empty());
        assert!(config.storage.database.is_none());
        assert!(config.logging.conversation_log.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate(&AgentRegistry::with_default_roster().ids()).is_empty());
    }

    #[test]
    fn test_validate_unknown_agent_is_warning() {
        let config: FileConfig = toml::from_str("[agents.oracle]\nmodel = \"x\"").unwrap();
        let issues = config.validate(&AgentRegistry::with_default_roster().ids());
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert_eq!(
            issues[0].code,
            ConfigIssueCode::UnknownAgent {
                id: "oracle".to_string()
            }
        );
    }

    #[test]
    fn test_validate_collects_every_error() {
        let toml_str = r#"
[governance]
global_per_minute = 0

[orchestration]
max_concurrency = 0
default_quality_threshold = -0.1
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate(&[]);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.is_error()));
    }
}
