//! [`AgentConfigStore`] backed by the loaded configuration file

use super::file_config::FileConfig;
use async_trait::async_trait;
use conclave_application::AgentConfigStore;
use conclave_domain::{AgentEndpointConfig, AgentId, CollaborationHint, UserId};

/// Serves per-agent settings, memory and guidance from `[agents.<id>]`
/// and `directives`.
///
/// Agents without a section get no config, so the invoker falls back to its
/// default (built from `[gateway]`).
pub struct FileAgentConfigStore {
    config: FileConfig,
}

impl FileAgentConfigStore {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AgentConfigStore for FileAgentConfigStore {
    async fn agent_config(&self, agent: &AgentId) -> Option<AgentEndpointConfig> {
        self.config
            .agents
            .get(agent.as_str())
            .map(|section| section.to_endpoint_config(&self.config.gateway))
    }

    async fn memory(&self, agent: &AgentId, user: &UserId) -> Vec<String> {
        self.config
            .agents
            .get(agent.as_str())
            .map(|section| section.memory_for(user.as_str()))
            .unwrap_or_default()
    }

    async fn strategic_directives(&self) -> Vec<String> {
        self.config.directives.clone()
    }

    async fn collaboration_hints(&self, agent: &AgentId) -> Vec<CollaborationHint> {
        self.config
            .agents
            .get(agent.as_str())
            .map(|section| section.hints())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FileAgentConfigStore {
        let config: FileConfig = toml::from_str(
            r#"
directives = ["Cite assumptions"]

[gateway]
api_key_env = "CONCLAVE_TEST_UNSET_KEY_VAR"
default_model = "base-model"

[agents.analyst]
temperature = 0.2
memory = ["one", "two"]
collaboration = [{ partner = "strategist", guidance = "Check the plan" }]
"#,
        )
        .unwrap();
        FileAgentConfigStore::new(config)
    }

    #[tokio::test]
    async fn test_configured_agent() {
        let store = store();
        let analyst = AgentId::new("analyst");
        let config = store.agent_config(&analyst).await.unwrap();
        assert_eq!(config.model, "base-model");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(store.memory(&analyst, &UserId::new("u")).await.len(), 2);
        assert_eq!(store.collaboration_hints(&analyst).await.len(), 1);
        assert_eq!(store.strategic_directives().await, vec!["Cite assumptions"]);
    }

    #[tokio::test]
    async fn test_unconfigured_agent() {
        let store = store();
        let creative = AgentId::new("creative");
        assert!(store.agent_config(&creative).await.is_none());
        assert!(store.memory(&creative, &UserId::new("u")).await.is_empty());
        assert!(store.collaboration_hints(&creative).await.is_empty());
    }
}
