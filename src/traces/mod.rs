mod cleanup;
mod policy;
mod trace;
mod types;
mod writer;

use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::shared::paths::ensure_dir;

pub use cleanup::cleanup_old_traces;
pub use policy::TracePolicy;
pub use trace::Trace;
pub use types::{LogEntry, LogLevel, TraceError};
pub use writer::LogWriter;

static TRACE_SINK: Lazy<Mutex<Option<(Sender<LogEntry>, TracePolicy)>>> =
    Lazy::new(|| Mutex::new(None));

/// Keeps the global trace writer alive. Dropping it detaches the sink and
/// waits for buffered entries to reach disk.
pub struct TracesGuard {
    writer: Option<LogWriter>,
}

impl Drop for TracesGuard {
    fn drop(&mut self) {
        if let Ok(mut sink) = TRACE_SINK.lock() {
            sink.take();
        }
        if let Some(writer) = self.writer.take() {
            writer.shutdown();
        }
    }
}

/// Install the global trace writer under `{log_dir}/traces`, removing files
/// older than yesterday first.
///
/// Returns `None` if the directory cannot be created or a writer is already
/// installed.
pub fn init_tracing(log_dir: &Path) -> Option<TracesGuard> {
    let traces_dir = log_dir.join("traces");
    if let Err(e) = ensure_dir(&traces_dir) {
        tracing::warn!(target: "system", "Failed to create traces directory: {}", e);
        return None;
    }
    cleanup_old_traces(&traces_dir);

    let mut sink = TRACE_SINK.lock().ok()?;
    if sink.is_some() {
        return None;
    }

    let writer = LogWriter::spawn(traces_dir);
    *sink = Some((writer.sender(), TracePolicy::from_env()));
    Some(TracesGuard {
        writer: Some(writer),
    })
}

/// Sender and policy of the global writer, or `None` outside `init_tracing`.
pub(crate) fn global_sink() -> Option<(Sender<LogEntry>, TracePolicy)> {
    TRACE_SINK.lock().ok()?.clone()
}
