//! Dispatch patterns

use crate::agent::entities::AgentRecord;
use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Below this complexity adaptive dispatch uses a single agent.
pub const ADAPTIVE_LOW_THRESHOLD: f64 = 0.3;
/// At or above this complexity adaptive dispatch uses every requested agent.
pub const ADAPTIVE_HIGH_THRESHOLD: f64 = 0.7;
/// Sequential dispatch stops once a non-final agent reaches this confidence.
pub const SEQUENTIAL_EARLY_STOP_CONFIDENCE: f64 = 0.95;

/// Strategy for dispatching a query to agents and fusing their outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestrationPattern {
    /// One after another, each seeing an excerpt of the previous answer
    Sequential,
    /// Race; first answer (in requested order) meeting the threshold wins
    Parallel,
    /// Everyone answers; answers are weighted and concatenated
    Ensemble,
    /// Everyone answers; the best score wins
    Competitive,
    /// Query complexity picks how many agents run sequentially
    #[default]
    Adaptive,
}

impl OrchestrationPattern {
    pub const ALL: [OrchestrationPattern; 5] = [
        OrchestrationPattern::Sequential,
        OrchestrationPattern::Parallel,
        OrchestrationPattern::Ensemble,
        OrchestrationPattern::Competitive,
        OrchestrationPattern::Adaptive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationPattern::Sequential => "sequential",
            OrchestrationPattern::Parallel => "parallel",
            OrchestrationPattern::Ensemble => "ensemble",
            OrchestrationPattern::Competitive => "competitive",
            OrchestrationPattern::Adaptive => "adaptive",
        }
    }

    /// Whether the pattern's agent calls are independent of each other.
    pub fn is_concurrent(&self) -> bool {
        matches!(
            self,
            OrchestrationPattern::Parallel
                | OrchestrationPattern::Ensemble
                | OrchestrationPattern::Competitive
        )
    }
}

impl std::fmt::Display for OrchestrationPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrchestrationPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(OrchestrationPattern::Sequential),
            "parallel" => Ok(OrchestrationPattern::Parallel),
            "ensemble" => Ok(OrchestrationPattern::Ensemble),
            "competitive" => Ok(OrchestrationPattern::Competitive),
            "adaptive" => Ok(OrchestrationPattern::Adaptive),
            other => Err(format!("unknown orchestration pattern '{}'", other)),
        }
    }
}

/// Agents adaptive dispatch hands to the sequential pattern.
///
/// - complexity < 0.3: the single best-priority agent (lowest `priority`,
///   earliest in `agents` on ties)
/// - 0.3 ≤ complexity < 0.7: the first two agents
/// - complexity ≥ 0.7: every agent
pub fn adaptive_selection(complexity: f64, agents: &[AgentRecord]) -> Vec<AgentId> {
    if complexity < ADAPTIVE_LOW_THRESHOLD {
        let best = agents
            .iter()
            .enumerate()
            .min_by_key(|(index, agent)| (agent.priority, *index))
            .map(|(_, agent)| agent.id.clone());
        return best.into_iter().collect();
    }
    let take = if complexity < ADAPTIVE_HIGH_THRESHOLD {
        2
    } else {
        agents.len()
    };
    agents.iter().take(take).map(|a| a.id.clone()).collect()
}

/// Sequential stop rule: stop after this agent?
pub fn should_stop_sequence(confidence: f64, is_last: bool) -> bool {
    !is_last && confidence >= SEQUENTIAL_EARLY_STOP_CONFIDENCE
}
