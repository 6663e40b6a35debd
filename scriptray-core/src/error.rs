//! Error types for Scriptray.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the core library.
///
/// None of these terminate the process on their own; the caller decides
/// whether an error is fatal (only [`Error::ResourceMissing`] is, at startup).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read settings from {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save settings to {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open output log {}: {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {}: {message}", path.display())]
    Launch { path: PathBuf, message: String },

    #[error("Script folder {} is not usable: {source}", path.display())]
    ScriptFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't find resource {0}")]
    ResourceMissing(String),

    #[error("Run queue has shut down")]
    QueueClosed,

    #[error("Could not determine a per-user config directory")]
    NoConfigDir,
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
