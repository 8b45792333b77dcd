//! Port for structured conversation logging.
//!
//! Records agent calls, consultations, admission denials and orchestration
//! outcomes as machine-readable events (one JSON object per line in the
//! file adapter). `tracing` carries the human-readable diagnostics; this
//! port carries the transcript.

use serde_json::Value;

/// A structured conversation event.
pub struct ConversationEvent {
    /// Event type identifier (`agent_call`, `consultation`, ...).
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation events.
///
/// `log` is synchronous and infallible; adapters swallow their own write
/// failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
