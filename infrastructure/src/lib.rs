//! Infrastructure layer for conclave
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading, the HTTP reasoning
//! gateway, the SQLite governance store and the JSONL conversation logger.

pub mod config;
pub mod gateway;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAgentConfig, FileAgentConfigStore, FileConfig, FileGatewayConfig,
    FileGovernanceConfig, FileOrchestrationConfig, FileOutputConfig, FileQuotaConfig,
};
pub use gateway::HttpReasoningGateway;
pub use logging::JsonlConversationLogger;
pub use storage::SqliteStore;
