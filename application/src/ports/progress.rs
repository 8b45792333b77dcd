//! Progress notification port
//!
//! Defines the interface for reporting progress during an orchestration.

use conclave_domain::{AgentId, OrchestrationPattern};

/// Callback for progress updates during an orchestration
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, ...).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a pattern starts dispatching to `agents`
    fn on_pattern_start(&self, pattern: OrchestrationPattern, agents: &[AgentId]);

    /// Called when one agent finishes, successfully or not
    fn on_agent_complete(&self, agent: &AgentId, success: bool);

    /// Called when the pattern has produced its result
    fn on_pattern_complete(&self, pattern: OrchestrationPattern, success: bool);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_pattern_start(&self, _pattern: OrchestrationPattern, _agents: &[AgentId]) {}
    fn on_agent_complete(&self, _agent: &AgentId, _success: bool) {}
    fn on_pattern_complete(&self, _pattern: OrchestrationPattern, _success: bool) {}
}
