use std::collections::HashSet;

use super::types::LogLevel;

/// Decides which trace entries reach disk.
///
/// Defaults keep only warnings and errors, and emit `trace_end` only for
/// traces that recorded an error. Override with
/// `CATALOG_ADMIN_TRACE_LEVELS=debug,info,warn,error` and
/// `CATALOG_ADMIN_TRACE_END_ALWAYS=1`.
#[derive(Debug, Clone)]
pub struct TracePolicy {
    allowed_levels: HashSet<LogLevel>,
    trace_end_only_on_error: bool,
}

impl Default for TracePolicy {
    fn default() -> Self {
        Self {
            allowed_levels: [LogLevel::Warn, LogLevel::Error].into_iter().collect(),
            trace_end_only_on_error: true,
        }
    }
}

impl TracePolicy {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("CATALOG_ADMIN_TRACE_LEVELS").ok().as_deref(),
            std::env::var("CATALOG_ADMIN_TRACE_END_ALWAYS").ok().as_deref(),
        )
    }

    fn from_values(levels: Option<&str>, end_always: Option<&str>) -> Self {
        let mut policy = Self::default();
        if let Some(levels) = levels {
            policy.allowed_levels = parse_levels(levels);
        }
        if let Some(flag) = end_always {
            policy.trace_end_only_on_error = !(flag == "1" || flag.eq_ignore_ascii_case("true"));
        }
        policy
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        self.allowed_levels.contains(&level)
    }

    pub fn should_emit_trace_end(&self, has_error: bool) -> bool {
        has_error || !self.trace_end_only_on_error
    }
}

fn parse_levels(val: &str) -> HashSet<LogLevel> {
    val.split(',')
        .filter_map(|part| match part.trim().to_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        })
        .collect()
}
