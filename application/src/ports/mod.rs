//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_config_store;
pub mod clock;
pub mod conversation_logger;
pub mod counter_store;
pub mod progress;
pub mod reasoning_gateway;
pub mod window_store;
