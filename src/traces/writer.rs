use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;

use super::types::LogEntry;

const BUFFER_CAPACITY: usize = 32;
const FLUSH_INTERVAL_MS: u64 = 100;

/// Background thread that appends trace entries to `{dir}/YYYY-MM-DD.jsonl`.
pub struct LogWriter {
    tx: Sender<LogEntry>,
    handle: Option<JoinHandle<()>>,
}

impl LogWriter {
    pub fn spawn(dir: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel::<LogEntry>();
        let handle = thread::spawn(move || writer_loop(rx, &dir));

        Self {
            tx,
            handle: Some(handle),
        }
    }

    pub fn sender(&self) -> Sender<LogEntry> {
        self.tx.clone()
    }

    /// Close the channel and wait for buffered entries to hit disk.
    /// Entries sent through cloned senders still alive are flushed when those drop.
    pub fn shutdown(mut self) {
        let handle = self.handle.take();
        drop(self);
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

fn writer_loop(rx: Receiver<LogEntry>, dir: &Path) {
    let mut buffer: Vec<LogEntry> = Vec::with_capacity(BUFFER_CAPACITY);
    let timeout = Duration::from_millis(FLUSH_INTERVAL_MS);

    loop {
        match rx.recv_timeout(timeout) {
            Ok(entry) => {
                buffer.push(entry);
                if buffer.len() >= BUFFER_CAPACITY {
                    flush_buffer(dir, &mut buffer);
                }
            }
            Err(RecvTimeoutError::Timeout) => flush_buffer(dir, &mut buffer),
            Err(RecvTimeoutError::Disconnected) => {
                flush_buffer(dir, &mut buffer);
                break;
            }
        }
    }
}

fn flush_buffer(dir: &Path, buffer: &mut Vec<LogEntry>) {
    if buffer.is_empty() {
        return;
    }

    let path = traces_path(dir, &Local::now().format("%Y-%m-%d").to_string());
    if let Err(e) = append_entries(&path, buffer) {
        tracing::warn!(target: "system", "Failed to write trace entries to {:?}: {}", path, e);
    }

    buffer.clear();
}

pub(crate) fn traces_path(dir: &Path, date: &str) -> PathBuf {
    dir.join(format!("{}.jsonl", date))
}

fn append_entries(path: &Path, entries: &[LogEntry]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);

    for entry in entries {
        serde_json::to_writer(&mut writer, entry)?;
        writer.write_all(b"\n")?;
    }

    writer.flush()
}
