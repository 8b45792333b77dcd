//! Per-agent configuration from TOML (`[agents.<id>]` sections)

use super::gateway::FileGatewayConfig;
use conclave_domain::{AgentEndpointConfig, AgentId, CollaborationHint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `collaboration` entry of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCollaborationHint {
    #[serde(default)]
    pub partner: Option<String>,
    pub guidance: String,
}

impl FileCollaborationHint {
    pub fn to_hint(&self) -> CollaborationHint {
        let hint = CollaborationHint::new(self.guidance.clone());
        match &self.partner {
            Some(partner) => hint.with_partner(partner.as_str()),
            None => hint,
        }
    }
}

/// Overrides for one agent. Unset fields fall back to `[gateway]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Base URL override for this agent only
    pub endpoint: Option<String>,
    /// Environment variable holding this agent's key
    pub api_key_env: Option<String>,
    /// Replaces the built-in specialization framing
    pub prompt: Option<String>,
    /// Prior interactions shared with every user, oldest first
    pub memory: Vec<String>,
    /// Prior interactions per user id, oldest first
    pub user_memory: BTreeMap<String, Vec<String>>,
    pub collaboration: Vec<FileCollaborationHint>,
}

impl FileAgentConfig {
    /// Endpoint configuration with `[gateway]` filling the gaps.
    pub fn to_endpoint_config(&self, gateway: &FileGatewayConfig) -> AgentEndpointConfig {
        let model = self
            .model
            .clone()
            .unwrap_or_else(|| gateway.default_model.clone());
        let mut config = AgentEndpointConfig::fallback(model)
            .with_temperature(self.temperature.unwrap_or(gateway.temperature))
            .with_max_tokens(self.max_tokens.unwrap_or(gateway.max_tokens));
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(prompt) = &self.prompt {
            config = config.with_prompt_template(prompt.clone());
        }
        if let Some(key) = gateway.resolve_api_key(self.api_key_env.as_deref()) {
            config = config.with_credential(key);
        }
        config
    }

    /// Shared memory followed by the user's own entries.
    pub fn memory_for(&self, user: &str) -> Vec<String> {
        let mut entries = self.memory.clone();
        if let Some(own) = self.user_memory.get(user) {
            entries.extend(own.iter().cloned());
        }
        entries
    }

    pub fn hints(&self) -> Vec<CollaborationHint> {
        self.collaboration.iter().map(|h| h.to_hint()).collect()
    }
}

/// `[agents]`: overrides keyed by agent id.
pub type FileAgentsConfig = BTreeMap<String, FileAgentConfig>;

pub(super) fn agent_ids(agents: &FileAgentsConfig) -> impl Iterator<Item = AgentId> + '_ {
    agents.keys().map(|id| AgentId::new(id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> FileGatewayConfig {
        FileGatewayConfig {
            api_key_env: "CONCLAVE_TEST_UNSET_KEY_VAR".to_string(),
            api_key: Some("sk-shared".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_overrides_and_gateway_fallback() {
        let agent: FileAgentConfig = toml::from_str(
            r#"
model = "gpt-4o"
endpoint = "http://localhost:8080/v1"
prompt = "You review numbers."
"#,
        )
        .unwrap();
        let config = agent.to_endpoint_config(&gateway());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.prompt_template.as_deref(), Some("You review numbers."));
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.credential.as_deref(), Some("sk-shared"));
    }

    #[test]
    fn test_memory_and_hints() {
        let agent: FileAgentConfig = toml::from_str(
            r#"
memory = ["shared note"]
collaboration = [
    { partner = "analyst", guidance = "Ask for numbers" },
    { guidance = "Stay brief" },
]

[user_memory]
alice = ["alice asked about pricing"]
"#,
        )
        .unwrap();
        assert_eq!(
            agent.memory_for("alice"),
            vec!["shared note", "alice asked about pricing"]
        );
        assert_eq!(agent.memory_for("bob"), vec!["shared note"]);

        let hints = agent.hints();
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].partner, Some(AgentId::new("analyst")));
        assert!(hints[1].partner.is_none());
    }
}
