use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::policy::TracePolicy;
use super::types::{LogEntry, LogLevel, TraceError};

/// A unit of work (usually one HTTP call) tracked from start to finish.
///
/// When no writer is installed the trace still records context and error
/// state but nothing is persisted.
pub struct Trace {
    id: String,
    started_at: Instant,
    context: Map<String, Value>,
    sink: Option<(Sender<LogEntry>, TracePolicy)>,
    has_error: AtomicBool,
}

impl Trace {
    fn generate_trace_id() -> String {
        format!("{:08x}", rand::random::<u32>())
    }

    /// Create a trace bound to the global writer, if any.
    pub fn new() -> Self {
        Self::with_sink(super::global_sink())
    }

    pub(crate) fn with_sink(sink: Option<(Sender<LogEntry>, TracePolicy)>) -> Self {
        Self {
            id: Self::generate_trace_id(),
            started_at: Instant::now(),
            context: Map::new(),
            sink,
            has_error: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attach a context field. Later values replace earlier ones.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.context.insert(key.to_string(), value.into());
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn has_error(&self) -> bool {
        self.has_error.load(Ordering::Relaxed)
    }

    fn emit(&self, level: LogLevel, msg: &str, err: Option<TraceError>) {
        if err.is_some() {
            self.has_error.store(true, Ordering::Relaxed);
        }

        let Some((tx, policy)) = &self.sink else {
            return;
        };
        if !policy.should_log(level) {
            return;
        }

        let entry = LogEntry {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            trace: self.id.clone(),
            level,
            msg: msg.to_string(),
            ctx: Value::Object(self.context.clone()),
            err,
            duration_ms: None,
            status: None,
        };

        // writer may have shut down
        let _ = tx.send(entry);
    }

    pub fn debug(&self, msg: &str) {
        self.emit(LogLevel::Debug, msg, None);
    }

    pub fn info(&self, msg: &str) {
        self.emit(LogLevel::Info, msg, None);
    }

    pub fn warn(&self, msg: &str) {
        self.emit(LogLevel::Warn, msg, None);
    }

    pub fn error(&self, msg: &str, err: TraceError) {
        self.emit(LogLevel::Error, msg, Some(err));
    }

    /// Close the trace, emitting a `trace_end` entry when the policy asks for one.
    pub fn finish(self) -> u64 {
        let duration_ms = self.started_at.elapsed().as_millis() as u64;
        let has_error = self.has_error();

        if let Some((tx, policy)) = &self.sink {
            if policy.should_emit_trace_end(has_error) {
                let entry = LogEntry {
                    ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    trace: self.id.clone(),
                    level: LogLevel::TraceEnd,
                    msg: "trace_end".to_string(),
                    ctx: Value::Object(self.context.clone()),
                    err: None,
                    duration_ms: Some(duration_ms),
                    status: Some(if has_error { "error" } else { "ok" }.to_string()),
                };
                let _ = tx.send(entry);
            }
        }

        duration_ms
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}
