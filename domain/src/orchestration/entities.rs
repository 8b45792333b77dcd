//! Orchestration lifecycle

use serde::{Deserialize, Serialize};

/// Stage of one orchestration.
///
/// ```text
/// Received → PatternSelected → Dispatching → Fused → Done
///                                   └──────────────→ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationStage {
    Received,
    PatternSelected,
    Dispatching,
    Fused,
    Done,
    /// Every agent invocation of the selected pattern failed
    Failed,
}

impl OrchestrationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationStage::Received => "received",
            OrchestrationStage::PatternSelected => "pattern_selected",
            OrchestrationStage::Dispatching => "dispatching",
            OrchestrationStage::Fused => "fused",
            OrchestrationStage::Done => "done",
            OrchestrationStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestrationStage::Done | OrchestrationStage::Failed)
    }
}

impl std::fmt::Display for OrchestrationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
