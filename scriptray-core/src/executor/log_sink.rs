//! Durable destinations for script output.
//!
//! Every line a script prints goes to the sink, whether or not output
//! capture is enabled. With capture off the sink is the only record of a run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

use crate::error::{Error, Result};

/// Which standard stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Receiver for mirrored script output.
pub trait LogSink: Send + Sync {
    /// A line printed by the script.
    fn line(&self, stream: OutputStream, text: &str);

    /// A line written by Scriptray itself (run start, completion, errors).
    fn note(&self, text: &str);
}

// =============================================================================
// File Sink
// =============================================================================

/// Appends every line to a log file that survives restarts.
///
/// Writes go through a dedicated writer thread, so callers on the async
/// runtime never touch the file. The writer is lossless: a full buffer
/// applies backpressure instead of dropping lines. Dropping the sink
/// flushes everything still queued.
pub struct FileLogSink {
    path: PathBuf,
    writer: NonBlocking,
    _guard: WorkerGuard,
}

impl FileLogSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::LogSink {
                path: path.clone(),
                source,
            })?;

        let (writer, guard) = NonBlockingBuilder::default()
            .lossy(false)
            .thread_name("scriptray-output-log")
            .finish(file);

        Ok(Self {
            path,
            writer,
            _guard: guard,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, text: &str) {
        let mut writer = self.writer.clone();
        if let Err(e) = writer.write_all(format!("{}\n", text).as_bytes()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write output log");
        }
    }
}

impl LogSink for FileLogSink {
    fn line(&self, _stream: OutputStream, text: &str) {
        self.append(text);
    }

    fn note(&self, text: &str) {
        self.append(text);
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

/// One recorded sink entry. `stream` is `None` for notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub stream: Option<OutputStream>,
    pub text: String,
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Script output lines only, in the order they were mirrored.
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.stream.is_some())
            .map(|e| e.text)
            .collect()
    }

    pub fn notes(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.stream.is_none())
            .map(|e| e.text)
            .collect()
    }

    fn push(&self, stream: Option<OutputStream>, text: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(LogEntry {
                stream,
                text: text.to_string(),
            });
    }
}

impl LogSink for MemoryLogSink {
    fn line(&self, stream: OutputStream, text: &str) {
        self.push(Some(stream), text);
    }

    fn note(&self, text: &str) {
        self.push(None, text);
    }
}
