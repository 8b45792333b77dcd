//! Agent configuration store port
//!
//! Per-agent endpoint settings, conversation memory, strategic directives and
//! collaboration hints. Every lookup tolerates absence: a missing entry is an
//! empty answer, never an error.

use async_trait::async_trait;
use conclave_domain::{AgentEndpointConfig, AgentId, CollaborationHint, UserId};

#[async_trait]
pub trait AgentConfigStore: Send + Sync {
    /// Endpoint settings for `agent`, if configured.
    async fn agent_config(&self, agent: &AgentId) -> Option<AgentEndpointConfig>;

    /// Prior interactions of `agent` with `user`, oldest first.
    async fn memory(&self, agent: &AgentId, user: &UserId) -> Vec<String>;

    /// Directives shared by every agent.
    async fn strategic_directives(&self) -> Vec<String>;

    /// Collaboration hints configured for `agent`.
    async fn collaboration_hints(&self, agent: &AgentId) -> Vec<CollaborationHint>;
}

/// Store with nothing configured.
pub struct EmptyConfigStore;

#[async_trait]
impl AgentConfigStore for EmptyConfigStore {
    async fn agent_config(&self, _agent: &AgentId) -> Option<AgentEndpointConfig> {
        None
    }

    async fn memory(&self, _agent: &AgentId, _user: &UserId) -> Vec<String> {
        Vec::new()
    }

    async fn strategic_directives(&self) -> Vec<String> {
        Vec::new()
    }

    async fn collaboration_hints(&self, _agent: &AgentId) -> Vec<CollaborationHint> {
        Vec::new()
    }
}
