//! Scriptray Core Library
//!
//! This crate provides everything behind the Scriptray launcher except the
//! window itself. It includes:
//!
//! - Settings store backed by a flat `key=value` file
//! - Program folder layout (settings, output log, application log)
//! - Script discovery in the configured script folder
//! - Script executor that mirrors every output line to a log sink
//! - Output classification (small notification vs. big text view)
//! - A single background run queue that serializes all work

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod output;
pub mod scripts;
pub mod worker;

#[cfg(all(test, unix))]
mod test_support;

// Re-exports for convenience
pub use config::{ProgramDirs, SettingKey, SettingsStore};
pub use context::{AppContext, ContextSnapshot};
pub use error::{Error, Result};

// Re-export executor
pub use executor::{
    ExecutionResult, FileLogSink, LogSink, MemoryLogSink, OutputStream, RunOptions,
    ScriptExecutor,
};

// Re-export output classification
pub use output::{classify_result, OutputKind, OutputThresholds};

// Re-export scripts
pub use scripts::{discover_scripts, ScriptRef};

// Re-export run queue
pub use worker::{event_channel, spawn_worker, EventReceiver, EventSender, RunQueue, WorkerCommand, WorkerEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
