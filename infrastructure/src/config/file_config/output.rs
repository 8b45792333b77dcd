//! Output, storage and logging configuration from TOML
//! (`[output]`, `[storage]` and `[logging]` sections)

use conclave_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format; `--output` wins when given
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar while agents run
    pub show_progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_progress: true,
        }
    }
}

/// `[storage]`: where shared governance state lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// SQLite database shared by every process. Absent keeps state in memory.
    pub database: Option<PathBuf>,
}

/// `[logging]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving conversation events
    pub conversation_log: Option<PathBuf>,
}
