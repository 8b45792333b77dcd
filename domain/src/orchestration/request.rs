//! Orchestration request

use crate::agent::value_objects::AgentId;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quality threshold of the parallel pattern when neither request nor config sets one.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.8;

/// One query to orchestrate. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    pub query: String,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Explicit agent subset in dispatch order; `None` means every registered agent.
    #[serde(default)]
    pub agents: Option<Vec<AgentId>>,
    /// Requested pattern name; unknown or missing names fall back to adaptive.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Threshold for the parallel race; `None` uses the configured default.
    #[serde(default)]
    pub quality_threshold: Option<f64>,
}

impl OrchestrationRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: BTreeMap::new(),
            agents: None,
            pattern: None,
            quality_threshold: None,
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_agents<I, A>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AgentId>,
    {
        self.agents = Some(agents.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }

    /// The requested threshold, else `default`.
    pub fn threshold_or(&self, default: f64) -> f64 {
        self.quality_threshold.unwrap_or(default)
    }

    /// Reject requests that cannot be orchestrated at all.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.query.trim().is_empty() {
            return Err(DomainError::InvalidRequest("query is empty".to_string()));
        }
        if let Some(threshold) = self.quality_threshold
            && !(0.0..=1.0).contains(&threshold)
        {
            return Err(DomainError::InvalidRequest(format!(
                "quality threshold {} is outside [0, 1]",
                threshold
            )));
        }
        if let Some(agents) = &self.agents
            && agents.is_empty()
        {
            return Err(DomainError::NoAgents);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = OrchestrationRequest::new("plan a launch")
            .with_context("audience", "developers")
            .with_agents(["strategist", "creative"])
            .with_pattern("sequential")
            .with_quality_threshold(0.9);

        assert_eq!(request.context.len(), 1);
        assert_eq!(request.agents.as_ref().unwrap()[0].as_str(), "strategist");
        assert_eq!(request.pattern.as_deref(), Some("sequential"));
        assert_eq!(request.threshold_or(DEFAULT_QUALITY_THRESHOLD), 0.9);
        assert!(request.validate().is_ok());
        assert_eq!(
            OrchestrationRequest::new("q").threshold_or(DEFAULT_QUALITY_THRESHOLD),
            0.8
        );
    }

    #[test]
    fn test_validate_rejects_empty_query() {
        assert!(matches!(
            OrchestrationRequest::new("   ").validate(),
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let request = OrchestrationRequest::new("q").with_quality_threshold(1.5);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_agent_subset() {
        let request = OrchestrationRequest::new("q").with_agents(Vec::<AgentId>::new());
        assert_eq!(request.validate(), Err(DomainError::NoAgents));
    }
}
