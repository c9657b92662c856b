use std::fs;
use std::path::Path;

use chrono::{Days, Local};

/// Delete trace files older than yesterday. Failures are logged, never returned.
pub fn cleanup_old_traces(traces_dir: &Path) {
    let Some(cutoff) = Local::now().checked_sub_days(Days::new(1)) else {
        return;
    };
    remove_traces_before(traces_dir, &cutoff.format("%Y-%m-%d").to_string());
}

fn remove_traces_before(traces_dir: &Path, cutoff_date: &str) {
    if !traces_dir.exists() {
        return;
    }

    let entries = match fs::read_dir(traces_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(target: "system", "Failed to read traces directory: {}", e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Some(date) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        // YYYY-MM-DD sorts lexicographically
        if date < cutoff_date {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(target: "system", "Failed to delete old trace file {:?}: {}", path, e);
            }
        }
    }
}
