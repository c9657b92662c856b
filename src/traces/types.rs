use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log level for trace entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    TraceEnd,
}

/// One JSONL line in the daily trace file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 timestamp with milliseconds
    pub ts: String,
    /// Trace ID (8 hex chars)
    pub trace: String,
    pub level: LogLevel,
    pub msg: String,
    /// Context fields attached to the trace
    pub ctx: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<TraceError>,
    /// Only present on trace_end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// "ok" or "error", only present on trace_end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Error details for trace logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceError {
    pub message: String,
    /// Machine-readable error code, e.g. `TAG_CREATE_FAILED`
    pub code: String,
}

impl TraceError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}
