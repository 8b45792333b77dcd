//! Consultation records

use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Result of asking one consultant for guidance.
///
/// A failed consultation is kept as an empty entry so the transcript shows
/// that the consultant was asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationEntry {
    pub consultant: AgentId,
    /// `None` when the consultation was issued outside any agent.
    pub requesting_agent: Option<AgentId>,
    /// Depth at which the consultant ran (1 for a direct consultation).
    pub depth: u8,
    pub response: String,
    pub confidence: f64,
    /// Dollars spent on this consultation, including nested ones.
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConsultationEntry {
    pub fn answered(
        consultant: AgentId,
        requesting_agent: Option<AgentId>,
        depth: u8,
        response: impl Into<String>,
        confidence: f64,
        cost: f64,
    ) -> Self {
        Self {
            consultant,
            requesting_agent,
            depth,
            response: response.into(),
            confidence,
            cost,
            error: None,
        }
    }

    pub fn empty(
        consultant: AgentId,
        requesting_agent: Option<AgentId>,
        depth: u8,
        error: impl Into<String>,
    ) -> Self {
        Self {
            consultant,
            requesting_agent,
            depth,
            response: String::new(),
            confidence: 0.0,
            cost: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }
}
