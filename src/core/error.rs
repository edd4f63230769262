//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Traversals themselves never fail: inaccessible entries are skipped where they
/// occur. These variants surface at the boundaries that can fail as a whole,
/// such as reading a single file or joining a blocking traversal task.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// Represents an error that occurred when a Tokio task was joined.
    /// This is often due to a task panicking or being cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Represents an error during the building of the watcher's exclusion globs.
    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] globset::Error),

    /// Represents a path that was expected to be a directory but was not.
    #[error("Path is not a valid directory: {0}")]
    NotADirectory(PathBuf),

    /// A file exceeds the per-file size ceiling for aggregation.
    #[error("File too large: {path} ({size} bytes, limit {limit} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    /// A file is binary by extension or by content.
    #[error("Binary or non-UTF-8 content: {0}")]
    Binary(PathBuf),

    /// The filesystem watcher could not be created or attached.
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}
