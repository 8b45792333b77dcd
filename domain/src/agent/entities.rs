//! Agent entities
//!
//! - [`AgentRecord`] - Capability record plus live performance counters
//! - [`PerformanceStats`] - Rolling success/latency statistics
//! - [`AgentCallOutcome`] - What happened on one call, fed back into the stats

use super::specialization::Specialization;
use super::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Capability record of one agent.
///
/// Owned by the [`AgentRegistry`](super::registry::AgentRegistry) for the
/// lifetime of the process; only `stats` changes after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub display_name: String,
    pub specialization: Specialization,
    /// Dispatch priority; 1 is the most preferred.
    pub priority: u8,
    /// Cost in dollars charged per call.
    pub cost_per_call: f64,
    /// Quality threshold in [0, 1]; doubles as the agent's fusion weight.
    pub quality_threshold: f64,
    /// Preferred consultation partners, in order.
    pub partners: Vec<AgentId>,
    #[serde(default)]
    pub stats: PerformanceStats,
}

impl AgentRecord {
    pub fn new(
        id: impl Into<AgentId>,
        display_name: impl Into<String>,
        specialization: Specialization,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            specialization,
            priority: 5,
            cost_per_call: 0.0,
            quality_threshold: 0.8,
            partners: Vec::new(),
            stats: PerformanceStats::default(),
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cost(mut self, cost_per_call: f64) -> Self {
        self.cost_per_call = cost_per_call;
        self
    }

    /// Sets the quality threshold, clamped to [0, 1].
    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_partners<I, A>(mut self, partners: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AgentId>,
    {
        self.partners = partners.into_iter().map(Into::into).collect();
        self
    }
}

/// Rolling performance counters for one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_calls: u64,
    pub success_count: u64,
    /// Mean latency over every recorded call, in milliseconds.
    pub average_latency_ms: f64,
    /// `success_count / total_calls`, 0 before the first call.
    pub success_rate: f64,
}

impl PerformanceStats {
    /// Fold one call outcome into the counters.
    pub fn record(&mut self, outcome: &AgentCallOutcome) {
        self.total_calls += 1;
        if outcome.success {
            self.success_count += 1;
        }
        let n = self.total_calls as f64;
        self.average_latency_ms += (outcome.latency_ms as f64 - self.average_latency_ms) / n;
        self.success_rate = self.success_count as f64 / n;
    }
}

/// Per-call record produced by every agent invocation, primary or consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCallOutcome {
    pub agent_id: AgentId,
    /// The agent that asked for this call, `None` for a top-level call.
    pub requesting_agent: Option<AgentId>,
    pub query_fingerprint: String,
    pub response_length: usize,
    pub latency_ms: u64,
    pub success: bool,
    pub confidence: f64,
}

impl AgentCallOutcome {
    pub fn success(
        agent_id: AgentId,
        query_fingerprint: impl Into<String>,
        response_length: usize,
        latency_ms: u64,
        confidence: f64,
    ) -> Self {
        Self {
            agent_id,
            requesting_agent: None,
            query_fingerprint: query_fingerprint.into(),
            response_length,
            latency_ms,
            success: true,
            confidence,
        }
    }

    pub fn failure(agent_id: AgentId, query_fingerprint: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            agent_id,
            requesting_agent: None,
            query_fingerprint: query_fingerprint.into(),
            response_length: 0,
            latency_ms,
            success: false,
            confidence: 0.0,
        }
    }

    pub fn requested_by(mut self, requester: Option<AgentId>) -> Self {
        self.requesting_agent = requester;
        self
    }
}
