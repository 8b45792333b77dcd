//! Reasoning gateway port
//!
//! Defines the interface for calling the remote reasoning service that backs
//! every agent.

use async_trait::async_trait;
use conclave_domain::{AgentEndpointConfig, AgentId};
use thiserror::Error;

/// Errors that can occur during a reasoning call
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One completion request sent on behalf of an agent.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub agent_id: AgentId,
    pub system_prompt: String,
    pub prompt: String,
    pub config: AgentEndpointConfig,
    /// Hardware hint from the caller's tier, passed through untouched.
    pub compute_profile: Option<String>,
}

/// Gateway to the reasoning service
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ReasoningGateway: Send + Sync {
    /// Send one prompt and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}
