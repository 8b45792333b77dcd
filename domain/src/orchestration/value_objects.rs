//! Orchestration value objects - immutable result types.
//!
//! - [`AgentResponse`] - One agent's successful answer, with its consultations
//! - [`AgentSubResult`] - One agent's slot in a result, success or failure
//! - [`PatternMetadata`] - Pattern-specific detail (scores, weights, …)
//! - [`OrchestrationResult`] - The unified answer returned to the caller

use super::pattern::OrchestrationPattern;
use crate::agent::specialization::Specialization;
use crate::agent::value_objects::AgentId;
use crate::consultation::entities::ConsultationEntry;
use serde::{Deserialize, Serialize};

/// Successful answer from a single agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: AgentId,
    pub specialization: Specialization,
    pub content: String,
    pub confidence: f64,
    pub latency_ms: u64,
    /// The agent's own call cost plus every consultation it triggered.
    pub cost: f64,
    #[serde(default)]
    pub consultations: Vec<ConsultationEntry>,
}

/// Outcome of one agent inside an orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSubResult {
    pub agent_id: AgentId,
    pub success: bool,
    pub content: String,
    pub confidence: f64,
    pub latency_ms: u64,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consultations: Vec<ConsultationEntry>,
}

impl AgentSubResult {
    pub fn failure(agent_id: AgentId, error: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            agent_id,
            success: false,
            content: String::new(),
            confidence: 0.0,
            latency_ms,
            cost: 0.0,
            error: Some(error.into()),
            consultations: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl From<AgentResponse> for AgentSubResult {
    fn from(response: AgentResponse) -> Self {
        Self {
            agent_id: response.agent_id,
            success: true,
            content: response.content,
            confidence: response.confidence,
            latency_ms: response.latency_ms,
            cost: response.cost,
            error: None,
            consultations: response.consultations,
        }
    }
}

/// Ensemble weight breakdown for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeight {
    pub agent_id: AgentId,
    /// `quality_threshold × confidence`
    pub raw: f64,
    /// `raw / Σ raw`
    pub normalized: f64,
    /// Whether the agent's section appears in the fused text.
    pub included: bool,
}

/// Competitive score of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveScore {
    pub agent_id: AgentId,
    pub score: f64,
}

/// Pattern-specific detail attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternMetadata {
    Sequential {
        stopped_early: bool,
        invoked: usize,
    },
    Parallel {
        threshold: f64,
        met_threshold: bool,
        winner: AgentId,
        /// Full score table when no agent met the threshold.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        scores: Vec<CompetitiveScore>,
    },
    Ensemble {
        weights: Vec<EnsembleWeight>,
    },
    Competitive {
        winner: AgentId,
        winning_score: f64,
        scores: Vec<CompetitiveScore>,
    },
    Adaptive {
        complexity: f64,
        selected: Vec<AgentId>,
        stopped_early: bool,
    },
}

/// The unified answer of one orchestration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub final_text: String,
    pub confidence: f64,
    pub pattern: OrchestrationPattern,
    /// Agents that answered successfully, in dispatch order.
    pub agents_used: Vec<AgentId>,
    pub sub_results: Vec<AgentSubResult>,
    pub total_cost: f64,
    pub total_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PatternMetadata>,
}

impl OrchestrationResult {
    /// Returns an iterator over only the successful sub-results.
    pub fn successful(&self) -> impl Iterator<Item = &AgentSubResult> {
        self.sub_results.iter().filter(|r| r.success)
    }

    /// Returns an iterator over only the failed sub-results.
    pub fn failed(&self) -> impl Iterator<Item = &AgentSubResult> {
        self.sub_results.iter().filter(|r| !r.success)
    }

    /// Total number of consultations across every sub-result.
    pub fn consultation_count(&self) -> usize {
        self.sub_results.iter().map(|r| r.consultations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_result_from_response() {
        let response = AgentResponse {
            agent_id: AgentId::new("analyst"),
            specialization: Specialization::Analytical,
            content: "ok".to_string(),
            confidence: 0.4,
            latency_ms: 12,
            cost: 0.03,
            consultations: vec![],
        };
        let sub: AgentSubResult = response.into();
        assert!(sub.is_success());
        assert_eq!(sub.content, "ok");
        assert!(sub.error.is_none());
    }

    #[test]
    fn test_metadata_serializes_with_kind_tag() {
        let metadata = PatternMetadata::Competitive {
            winner: AgentId::new("b"),
            winning_score: 0.81,
            scores: vec![],
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["kind"], "competitive");
        assert_eq!(json["winner"], "b");
    }
}
