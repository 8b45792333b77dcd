//! Application layer for conclave
//!
//! This crate contains use cases, port definitions, governance services and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod governance;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::OrchestrationParams;
pub use governance::{
    InMemoryCounterStore, InMemoryWindowStore, QuotaReservation, RateGovernor, TierQuotaManager,
};
pub use ports::{
    agent_config_store::{AgentConfigStore, EmptyConfigStore},
    clock::{Clock, ManualClock, SystemClock},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    counter_store::{CounterStore, StoreError},
    progress::{NoProgress, ProgressNotifier},
    reasoning_gateway::{CompletionRequest, GatewayError, ReasoningGateway},
    window_store::WindowStore,
};
pub use use_cases::invoke_agent::{
    AgentInvoker, ConsultError, InvocationContext, InvokeError, SharedRegistry,
};
pub use use_cases::orchestrate::{Caller, FALLBACK_RESPONSE, OrchestrateError, OrchestrateUseCase};
