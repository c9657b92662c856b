use std::collections::HashMap;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::shared::paths::ensure_dir;

/// Log targets that get their own daily file. Everything else goes to `system.log`.
pub const LOG_TARGETS: [&str; 2] = ["admin", "catalog"];

/// Keeps the non-blocking writers alive. Dropping it flushes and stops them.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

struct TargetWriter {
    writers: HashMap<&'static str, NonBlocking>,
    system_writer: NonBlocking,
}

impl TargetWriter {
    fn writer_for_target(&self, target: &str) -> &NonBlocking {
        self.writers
            .iter()
            .find(|(name, _)| target_matches(target, name))
            .map(|(_, writer)| writer)
            .unwrap_or(&self.system_writer)
    }
}

fn target_matches(target: &str, name: &str) -> bool {
    target == name
        || target
            .strip_prefix(name)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<'a> MakeWriter<'a> for TargetWriter {
    type Writer = NonBlocking;

    fn make_writer(&'a self) -> Self::Writer {
        self.system_writer.clone()
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        self.writer_for_target(meta.target()).clone()
    }
}

/// Install the global subscriber writing daily rolling files under `log_dir`.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. If a subscriber is
/// already installed the new one is discarded.
pub fn init_logging(log_dir: &Path) -> std::io::Result<LoggingGuards> {
    ensure_dir(log_dir)?;

    let mut guards = Vec::new();
    let mut writers = HashMap::new();

    for target in LOG_TARGETS {
        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", target));
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        writers.insert(target, non_blocking);
        guards.push(guard);
    }

    let system_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "system.log");
    let (system_writer, system_guard) = tracing_appender::non_blocking(system_appender);
    guards.push(system_guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(TargetWriter {
                writers,
                system_writer,
            })
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("[catalog-admin] tracing subscriber already installed, keeping it");
    }

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    Ok(LoggingGuards { _guards: guards })
}

/// `log_target!("admin", info, "...")` forwards to `tracing::info!(target: "admin", ...)`.
#[macro_export]
macro_rules! log_target {
    ($target:expr, $level:ident, $($arg:tt)+) => {
        tracing::$level!(target: $target, $($arg)+)
    };
}
