pub mod error;
pub mod file_handler;
pub mod ignore;
pub mod pattern;
pub mod scanner;
pub mod tree_generator;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Whether a filesystem entry is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn is_directory(self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// One visible filesystem entry produced by a walk.
///
/// Directories own their children, already ordered directories first and then
/// by name (byte-wise, so case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDescriptor {
    pub name: String,
    pub path: PathBuf,
    /// Path relative to the walk root, always with `/` separators.
    pub relative_path: String,
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntryDescriptor>,
}

impl EntryDescriptor {
    /// Creates a directory descriptor for a root, with the given children.
    pub fn root(path: &Path, children: Vec<EntryDescriptor>) -> Self {
        Self {
            name: display_name(path),
            path: path.to_path_buf(),
            relative_path: String::new(),
            kind: EntryKind::Directory,
            children,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Size in bytes, stat'd on demand. `None` for directories and for files
    /// that can no longer be stat'd.
    pub fn size(&self) -> Option<u64> {
        if self.is_directory() {
            return None;
        }
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }

    /// Iterates over all descendants in pre-order (this node excluded).
    pub fn descendants(&self) -> impl Iterator<Item = &EntryDescriptor> {
        let mut stack: Vec<&EntryDescriptor> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// The base name of a path, falling back to the full path for roots like `/`.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Computes `path` relative to `root` with forward-slash separators.
///
/// Paths outside `root` are expressed with `..` components.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub use error::CoreError;
pub use file_handler::{AggregationResult, FileHandler};
pub use ignore::{build_watch_globset, BuiltinExclusions, RuleSet};
pub use pattern::IgnoreRule;
pub use scanner::{DirectoryScanner, WalkMode};
pub use tree_generator::TreeGenerator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/project");
        let nested = root.join("src").join("core").join("mod.rs");
        assert_eq!(relative_path(&nested, root), "src/core/mod.rs");
        assert_eq!(relative_path(root, root), "");
    }

    #[test]
    fn test_relative_path_outside_root() {
        assert_eq!(
            relative_path(Path::new("/elsewhere/a.txt"), Path::new("/project")),
            "../elsewhere/a.txt"
        );
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let file = |name: &str| EntryDescriptor {
            name: name.to_string(),
            path: PathBuf::from(name),
            relative_path: name.to_string(),
            kind: EntryKind::File,
            children: Vec::new(),
        };
        let dir = EntryDescriptor {
            kind: EntryKind::Directory,
            children: vec![file("b/c.txt")],
            ..file("b")
        };
        let root = EntryDescriptor::root(Path::new("/root"), vec![dir, file("a.txt")]);

        let order: Vec<_> = root.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(order, vec!["b", "b/c.txt", "a.txt"]);
    }
}
