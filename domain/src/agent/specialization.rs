//! Agent specializations

use serde::{Deserialize, Serialize};

/// The specialty an agent brings to an orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    /// Idea generation, drafting, alternatives
    Creative,
    /// Critical review, verification, risk analysis
    Analytical,
    /// Merging several viewpoints into one answer
    Synthesis,
    /// Long-horizon planning and prioritisation
    Strategic,
    /// Coordinates the other agents; may consult all of them
    MasterOrchestrator,
}

impl Specialization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::Creative => "creative",
            Specialization::Analytical => "analytical",
            Specialization::Synthesis => "synthesis",
            Specialization::Strategic => "strategic",
            Specialization::MasterOrchestrator => "master_orchestrator",
        }
    }

    /// Human-readable role name used in prompts.
    pub fn role(&self) -> &'static str {
        match self {
            Specialization::Creative => "creative generation",
            Specialization::Analytical => "analytical review",
            Specialization::Synthesis => "synthesis",
            Specialization::Strategic => "strategic planning",
            Specialization::MasterOrchestrator => "master coordination",
        }
    }

    /// Built-in framing placed at the top of every prompt for this specialty.
    pub fn framing(&self) -> &'static str {
        match self {
            Specialization::Creative => {
                "You are a creative specialist. Generate original, varied ideas and \
                 concrete drafts. Prefer several distinct options over one safe answer."
            }
            Specialization::Analytical => {
                "You are an analytical specialist. Examine claims critically, check \
                 assumptions, quantify where possible, and point out risks and gaps."
            }
            Specialization::Synthesis => {
                "You are a synthesis specialist. Combine multiple perspectives into a \
                 single coherent answer and resolve contradictions explicitly."
            }
            Specialization::Strategic => {
                "You are a strategic planning specialist. Lay out goals, sequencing, \
                 trade-offs and the next concrete steps."
            }
            Specialization::MasterOrchestrator => {
                "You are the master coordinator. Weigh the contributions of every \
                 specialty and produce a decisive, well-structured final answer."
            }
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self, Specialization::MasterOrchestrator)
    }
}

impl std::fmt::Display for Specialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Specialization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creative" => Ok(Specialization::Creative),
            "analytical" | "analysis" => Ok(Specialization::Analytical),
            "synthesis" => Ok(Specialization::Synthesis),
            "strategic" | "strategy" => Ok(Specialization::Strategic),
            "master_orchestrator" | "master" | "orchestrator" => {
                Ok(Specialization::MasterOrchestrator)
            }
            other => Err(format!("unknown specialization '{}'", other)),
        }
    }
}
