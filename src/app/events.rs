//! Defines the status values and events passed from the backend to its shell.

use std::fmt;
use std::path::PathBuf;

/// The outcome of a boundary operation, shown to the user as one line.
///
/// The rendered text carries a leading sentinel: `✅` for success,
/// `❌ Error:` for failures, nothing for informational outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    Info(String),
    Error(String),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success(message) => write!(f, "✅ {message}"),
            Status::Info(message) => write!(f, "{message}"),
            Status::Error(message) => write!(f, "❌ Error: {message}"),
        }
    }
}

/// Events sent from background tasks to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// Something changed under the watched root. Carries no per-file detail.
    FileSystemChanged { root: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_sentinels() {
        assert_eq!(
            Status::Success("Copied directory structure.".into()).to_string(),
            "✅ Copied directory structure."
        );
        assert_eq!(
            Status::Info("No text content found.".into()).to_string(),
            "No text content found."
        );
        assert_eq!(
            Status::Error("Root not found".into()).to_string(),
            "❌ Error: Root not found"
        );
    }
}
