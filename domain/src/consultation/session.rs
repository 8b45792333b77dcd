//! Depth-bounded consultation session

use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum nesting of consultations.
pub const DEFAULT_MAX_CONSULTATION_DEPTH: u8 = 2;

/// Raised when a consultation would nest deeper than allowed.
///
/// Recoverable: the caller simply proceeds without that consultation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Consultation depth {depth} reached the maximum of {max}")]
pub struct ConsultationDepthExceeded {
    pub depth: u8,
    pub max: u8,
}

/// Bounded-depth consultation state for one orchestration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationSession {
    depth: u8,
    max_depth: u8,
    requesting_agent: Option<AgentId>,
}

impl ConsultationSession {
    /// Session for a new top-level call (depth 0, no requester).
    pub fn top_level(max_depth: u8) -> Self {
        Self {
            depth: 0,
            max_depth,
            requesting_agent: None,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn requesting_agent(&self) -> Option<&AgentId> {
        self.requesting_agent.as_ref()
    }

    pub fn is_top_level(&self) -> bool {
        self.requesting_agent.is_none()
    }

    /// Whether another level of consultation is permitted.
    pub fn can_consult(&self) -> bool {
        self.depth < self.max_depth
    }

    /// Session seen by a consultation issued on behalf of `requester`.
    ///
    /// A missing requester marks a new top-level call and resets the depth.
    pub fn for_requester(&self, requester: Option<&AgentId>) -> Self {
        match requester {
            None => Self::top_level(self.max_depth),
            Some(agent) => Self {
                depth: self.depth,
                max_depth: self.max_depth,
                requesting_agent: Some(agent.clone()),
            },
        }
    }

    /// Enter one nested consultation level.
    pub fn enter(&self) -> Result<Self, ConsultationDepthExceeded> {
        if !self.can_consult() {
            return Err(ConsultationDepthExceeded {
                depth: self.depth,
                max: self.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            max_depth: self.max_depth,
            requesting_agent: self.requesting_agent.clone(),
        })
    }
}

impl Default for ConsultationSession {
    fn default() -> Self {
        Self::top_level(DEFAULT_MAX_CONSULTATION_DEPTH)
    }
}
