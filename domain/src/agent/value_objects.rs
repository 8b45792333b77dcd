//! Agent value objects
//!
//! - [`AgentId`] - Stable identifier of a registered agent
//! - [`AgentEndpointConfig`] - Connection and sampling settings for one agent
//! - [`CollaborationHint`] - Guidance about how an agent should work with a peer

use serde::{Deserialize, Serialize};

/// Stable identifier of a registered agent (e.g. `"analyst"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection and sampling settings used when calling the remote
/// reasoning service on behalf of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEndpointConfig {
    /// Override for the reasoning service base URL. `None` uses the gateway default.
    pub endpoint: Option<String>,
    /// Credential presented to the reasoning service.
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-agent specialization framing that replaces the built-in one.
    pub prompt_template: Option<String>,
}

impl AgentEndpointConfig {
    /// Built-in configuration used when the config store has nothing for an agent.
    pub fn fallback(model: impl Into<String>) -> Self {
        Self {
            endpoint: None,
            credential: None,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2048,
            prompt_template: None,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }
}

/// Guidance about how an agent should collaborate, optionally tied to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationHint {
    #[serde(default)]
    pub partner: Option<AgentId>,
    pub guidance: String,
}

impl CollaborationHint {
    pub fn new(guidance: impl Into<String>) -> Self {
        Self {
            partner: None,
            guidance: guidance.into(),
        }
    }

    pub fn with_partner(mut self, partner: impl Into<AgentId>) -> Self {
        self.partner = Some(partner.into());
        self
    }
}
