//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("No agents available for orchestration")]
    NoAgents,

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid tier: {0}")]
    InvalidTier(String),
}

impl DomainError {
    /// Check if this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidRequest(_) | DomainError::InvalidTier(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_agent_display() {
        let error = DomainError::UnknownAgent("oracle".to_string());
        assert_eq!(error.to_string(), "Unknown agent: oracle");
    }

    #[test]
    fn test_is_client_error() {
        assert!(DomainError::InvalidRequest("empty".to_string()).is_client_error());
        assert!(DomainError::InvalidTier("gold".to_string()).is_client_error());
        assert!(!DomainError::NoAgents.is_client_error());
    }
}
