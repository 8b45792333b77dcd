//! Orchestration parameters - use case control.
//!
//! [`OrchestrationParams`] groups the static parameters that bound one
//! orchestration: consultation depth, per-call timeout, fan-out and memory
//! size. These are application-layer concerns, not domain policy.

use conclave_domain::{DEFAULT_MAX_CONSULTATION_DEPTH, DEFAULT_QUALITY_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationParams {
    /// Maximum nesting of consultations.
    pub max_consultation_depth: u8,
    /// Timeout for each outbound reasoning call.
    pub call_timeout: Duration,
    /// Upper bound on agents running at once in concurrent patterns.
    pub max_concurrency: usize,
    /// Most recent memory entries included in a prompt.
    pub memory_entries: usize,
    /// Threshold applied when a request does not set one.
    pub default_quality_threshold: f64,
}

impl Default for OrchestrationParams {
    fn default() -> Self {
        Self {
            max_consultation_depth: DEFAULT_MAX_CONSULTATION_DEPTH,
            call_timeout: Duration::from_secs(60),
            max_concurrency: 4,
            memory_entries: 3,
            default_quality_threshold: DEFAULT_QUALITY_THRESHOLD,
        }
    }
}

impl OrchestrationParams {
    // ==================== Builder Methods ====================

    pub fn with_max_consultation_depth(mut self, depth: u8) -> Self {
        self.max_consultation_depth = depth;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_memory_entries(mut self, entries: usize) -> Self {
        self.memory_entries = entries;
        self
    }

    pub fn with_default_quality_threshold(mut self, threshold: f64) -> Self {
        self.default_quality_threshold = threshold;
        self
    }
}
