//! Recursively enumerates a directory into a tree of visible entries.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

use super::{display_name, relative_path, EntryDescriptor, EntryKind, RuleSet};

/// Which exclusions a walk applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Built-in and custom rules: the browsable tree and copy expansion.
    Filtered,
    /// Only built-in directory exclusions: the structure diagram.
    Unfiltered,
}

pub struct DirectoryScanner {
    rules: Arc<RuleSet>,
}

impl DirectoryScanner {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// Builds the root descriptor for `root`, or `None` if it is not a directory.
    pub fn scan_root(&self, root: &Path, mode: WalkMode) -> Option<EntryDescriptor> {
        if !root.is_dir() {
            tracing::warn!("Cannot scan {:?}: not an accessible directory", root);
            return None;
        }
        let children = self.walk(root, root, mode);
        let tree = EntryDescriptor::root(root, children);
        tracing::info!(
            "Scanned {:?} ({:?}): {} visible entries",
            root,
            mode,
            tree.descendants().count()
        );
        Some(tree)
    }

    /// Walks `directory` depth-first and returns its visible children, each with
    /// its own visible subtree. Relative paths are computed against `root`.
    ///
    /// Entries that cannot be stat'd or read are skipped, so an unreadable
    /// directory shows up with no children. An unreadable `directory` yields an
    /// empty list. Symlinks are followed; a link back into its own ancestry is
    /// reported by `walkdir` as a loop and skipped.
    pub fn walk(&self, directory: &Path, root: &Path, mode: WalkMode) -> Vec<EntryDescriptor> {
        // stack[d] is the open directory at depth d; stack[0] collects the result.
        let mut stack = vec![EntryDescriptor::root(directory, Vec::new())];

        let walker = WalkDir::new(directory)
            .follow_links(true)
            .sort_by(compare_entries)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.is_visible(entry, root, mode));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping inaccessible entry: {}", e);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let Some(kind) = entry_kind(&entry) else {
                continue;
            };

            close_until(&mut stack, entry.depth());

            let descriptor = EntryDescriptor {
                name: display_name(entry.path()),
                path: entry.path().to_path_buf(),
                relative_path: relative_path(entry.path(), root),
                kind,
                children: Vec::new(),
            };
            match kind {
                EntryKind::Directory => stack.push(descriptor),
                EntryKind::File => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(descriptor);
                    }
                }
            }
        }

        close_until(&mut stack, 1);
        stack.pop().map(|top| top.children).unwrap_or_default()
    }

    fn is_visible(&self, entry: &DirEntry, root: &Path, mode: WalkMode) -> bool {
        let Some(kind) = entry_kind(entry) else {
            return false;
        };
        let name = entry.file_name().to_string_lossy();
        let hidden = match mode {
            WalkMode::Filtered => {
                let relative = relative_path(entry.path(), root);
                self.rules.should_ignore(&name, kind, &relative)
            }
            WalkMode::Unfiltered => self.rules.excludes_builtin_directory(&name, kind),
        };
        if hidden {
            tracing::debug!("Ignoring {:?}", entry.path());
        }
        !hidden
    }
}

/// Regular files and directories only; sockets, devices and the like are skipped.
fn entry_kind(entry: &DirEntry) -> Option<EntryKind> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        Some(EntryKind::Directory)
    } else if file_type.is_file() {
        Some(EntryKind::File)
    } else {
        None
    }
}

/// Directories before files, then by name (byte order, case-sensitive).
fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    sorts_as_directory(b)
        .cmp(&sorts_as_directory(a))
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Entries are sorted before links are followed, so symlinks need a stat.
fn sorts_as_directory(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir())
}

/// Closes open directories until the stack holds exactly `depth` levels,
/// attaching each closed directory to its parent.
fn close_until(stack: &mut Vec<EntryDescriptor>, depth: usize) {
    while stack.len() > depth.max(1) {
        if let Some(finished) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(finished);
            }
        }
    }
}
