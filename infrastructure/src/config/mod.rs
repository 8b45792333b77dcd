//! Configuration file loading for conclave
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONCLAVE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./conclave.toml` or `./.conclave.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
//! 5. Default values

mod agent_store;
mod file_config;
mod loader;

pub use agent_store::FileAgentConfigStore;
pub use file_config::{
    DEFAULT_API_KEY_ENV, FileAgentConfig, FileAgentsConfig, FileCollaborationHint, FileConfig,
    FileGatewayConfig, FileGovernanceConfig, FileLoggingConfig, FileOrchestrationConfig,
    FileOutputConfig, FileQuotaConfig, FileStorageConfig, FileTierQuotaConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
