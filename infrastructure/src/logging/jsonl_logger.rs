//! JSONL file writer for conversation events.
//!
//! Each [`ConversationEvent`] becomes one JSON line with `type` and
//! `timestamp` merged into the payload. The file is opened in append mode so
//! successive runs share one transcript.

use conclave_application::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL conversation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every event and on `Drop`.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create conversation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not open conversation log file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: ConversationEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert(
            "type".to_string(),
            Value::String(event.event_type.to_string()),
        );
        map.insert("timestamp".to_string(), Value::String(timestamp));
        Value::Object(map)
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Could not write conversation log {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_jsonl_logger_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            "agent_call",
            serde_json::json!({
                "agent": "analyst",
                "success": true,
                "latency_ms": 42
            }),
        ));
        logger.log(ConversationEvent::new(
            "admission_denied",
            serde_json::json!({ "user": "alice", "reason": "user_per_minute" }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.get("timestamp").is_some()));
        assert_eq!(lines[0]["type"], "agent_call");
        assert_eq!(lines[0]["agent"], "analyst");
        assert_eq!(lines[0]["latency_ms"], 42);
        assert_eq!(lines[1]["type"], "admission_denied");
        assert_eq!(lines[1]["user"], "alice");
    }

    #[test]
    fn test_jsonl_logger_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.jsonl");

        for run in 0..2 {
            let logger = JsonlConversationLogger::new(&path).unwrap();
            logger.log(ConversationEvent::new(
                "orchestration_complete",
                serde_json::json!({ "run": run }),
            ));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["run"], 1);
    }

    #[test]
    fn test_jsonl_logger_wraps_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let logger = JsonlConversationLogger::new(&path).unwrap();

        logger.log(ConversationEvent::new(
            "consultation",
            serde_json::json!("just a string"),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "consultation");
        assert_eq!(lines[0]["data"], "just a string");
    }

    #[test]
    fn test_jsonl_logger_returns_none_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlConversationLogger::new(dir.path()).is_none());
    }
}
