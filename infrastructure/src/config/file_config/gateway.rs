//! Reasoning gateway configuration from TOML (`[gateway]` section)

use conclave_domain::AgentEndpointConfig;
use serde::{Deserialize, Serialize};

/// Default environment variable holding the reasoning service key.
pub const DEFAULT_API_KEY_ENV: &str = "CONCLAVE_API_KEY";

/// Connection settings shared by every agent unless overridden in `[agents.<id>]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Base URL of an OpenAI-compatible API (default: "https://api.openai.com/v1")
    pub base_url: String,
    /// Environment variable name for the API key (default: "CONCLAVE_API_KEY")
    pub api_key_env: String,
    /// Direct API key (prefer the environment variable)
    pub api_key: Option<String>,
    /// Model used by agents without their own (default: "gpt-4o-mini")
    pub default_model: String,
    /// Sampling temperature (default: 0.7)
    pub temperature: f32,
    /// Max tokens per response (default: 2048)
    pub max_tokens: u32,
    /// Fail calls that have no credential instead of sending them unauthenticated.
    /// Turn off for local servers (default: true)
    pub require_credential: bool,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        let fallback = AgentEndpointConfig::fallback("gpt-4o-mini");
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            default_model: fallback.model,
            temperature: fallback.temperature,
            max_tokens: fallback.max_tokens,
            require_credential: true,
        }
    }
}

impl FileGatewayConfig {
    /// Reads the key from `env_name` (or the gateway's variable), then the inline key.
    pub fn resolve_api_key(&self, env_name: Option<&str>) -> Option<String> {
        let env_name = env_name.unwrap_or(&self.api_key_env);
        std::env::var(env_name)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// Configuration applied to agents without an `[agents.<id>]` section.
    pub fn default_agent_config(&self) -> AgentEndpointConfig {
        let config = AgentEndpointConfig::fallback(self.default_model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        match self.resolve_api_key(None) {
            Some(key) => config.with_credential(key),
            None => config,
        }
    }
}
