//! Error type shared by every stage of the sync pipeline.
//!
//! Each stage returns `Result<_, SyncError>`; nothing is retried except the single
//! regional-to-accelerated upload fallback in [`crate::uploader`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A required input was absent or empty.
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid boolean value for {name}: {value}")]
    InvalidBoolean { name: String, value: String },

    #[error("Invalid value for {name}: {value} (expected one of: {expected})")]
    InvalidChoice {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("No artifact patterns provided after normalization")]
    NoPatterns,

    #[error("Invalid glob pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("No files matched pattern: {0}")]
    NoMatches(String),

    #[error("working_directory must be inside the workspace: {0}")]
    WorkingDirectoryOutside(PathBuf),

    #[error("working_directory does not exist or is not a directory: {0}")]
    WorkingDirectoryMissing(PathBuf),

    #[error("Path must be within workspace: {0}")]
    OutsideWorkspace(PathBuf),

    #[error("Path is neither file nor directory: {0}")]
    NotFileOrDirectory(PathBuf),

    /// Staging would change the type of an already staged destination.
    #[error("Collision while staging {kind} ({existing} already staged here): {path}")]
    Collision {
        kind: &'static str,
        existing: &'static str,
        path: PathBuf,
    },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external command ran but exited unsuccessfully.
    #[error("{command} exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("Upload failed after retry with accelerate endpoint: {0}")]
    UploadFailed(Box<SyncError>),

    #[error("CDN purge failed: {0}")]
    PurgeFailed(Box<SyncError>),
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
