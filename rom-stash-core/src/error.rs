use std::path::PathBuf;

use thiserror::Error;

/// Errors shared across the rom-stash crates.
#[derive(Debug, Error)]
pub enum StashError {
    /// I/O error while reading or writing ROM data
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed DAT or index content, duplicate game names
    #[error("{0}")]
    Content(String),

    /// No archive provider is registered for a file
    #[error("no archive provider for {}", .0.display())]
    ArchiverNotFound(PathBuf),

    /// The provider cannot perform the requested operation
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// A provider call failed structurally (unparseable output, corrupt archive)
    #[error("processing error: {0}")]
    Processing(String),

    /// An external tool returned a non-zero exit status
    #[error("{cmd} exited with status {status}: {stderr}")]
    Exec {
        cmd: String,
        status: i32,
        stderr: String,
    },

    /// Index file is not valid YAML/JSON or not a mapping
    #[error("invalid index: {0}")]
    Load(String),

    /// The current operation was cancelled between items
    #[error("cancelled")]
    Cancelled,
}

impl StashError {
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }
}
