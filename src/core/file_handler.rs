//! Reads and concatenates file contents for a selection of paths.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{display_name, relative_path, CoreError, DirectoryScanner, EntryDescriptor, RuleSet, WalkMode};
use crate::utils::file_detection::decode_text;

/// Files above this size are never loaded for copying.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// The output of one copy operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationResult {
    /// Concatenated file blocks (and placeholders for explicit items that could not be read).
    pub content: String,
    /// Input items that contributed at least one file block.
    pub included_items: usize,
    /// Input items that contributed no file block: missing, binary, unreadable,
    /// oversized, or directories with nothing visible inside.
    pub empty_items: usize,
}

impl AggregationResult {
    /// `false` when no item produced readable text, even if placeholders were written.
    pub fn has_content(&self) -> bool {
        self.included_items > 0
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

pub struct FileHandler {
    rules: Arc<RuleSet>,
    max_file_size: u64,
}

impl FileHandler {
    pub fn new(rules: Arc<RuleSet>, max_file_size: u64) -> Self {
        Self {
            rules,
            max_file_size,
        }
    }

    /// Concatenates the contents of `paths`, in order, relative to `root`.
    ///
    /// Top-level paths are explicit selections: custom rules do not apply to
    /// them, and a file that cannot be copied leaves a placeholder block.
    /// Directories are expanded with the same filtering as the browsable tree,
    /// and descendants that cannot be copied are dropped silently.
    pub fn aggregate(&self, paths: &[PathBuf], root: &Path) -> AggregationResult {
        let mut result = AggregationResult::default();

        for path in paths {
            let blocks = self.aggregate_explicit(path, root, &mut result.content);
            if blocks > 0 {
                result.included_items += 1;
            } else {
                result.empty_items += 1;
            }
        }

        tracing::info!(
            "Aggregated {} items ({} without content), {} chars",
            result.included_items,
            result.empty_items,
            result.content.len()
        );
        result
    }

    /// Appends the blocks for one explicit item and returns how many file blocks it wrote.
    fn aggregate_explicit(&self, path: &Path, root: &Path, out: &mut String) -> usize {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                return 0;
            }
        };

        if metadata.is_file() {
            let relative = relative_path(path, root);
            match self.read_text(path, metadata.len()) {
                Ok(text) => {
                    push_file_block(out, &relative, &text);
                    1
                }
                Err(e) => {
                    tracing::debug!("Placeholder for {:?}: {}", path, e);
                    push_placeholder(out, &relative, &e);
                    0
                }
            }
        } else if metadata.is_dir() {
            let scanner = DirectoryScanner::new(self.rules.clone());
            let tree = EntryDescriptor::root(path, scanner.walk(path, root, WalkMode::Filtered));
            let mut blocks = 0;
            for entry in tree.descendants().filter(|e| !e.is_directory()) {
                let Some(size) = entry.size() else {
                    continue;
                };
                match self.read_text(&entry.path, size) {
                    Ok(text) => {
                        push_file_block(out, &entry.relative_path, &text);
                        blocks += 1;
                    }
                    Err(e) => tracing::debug!("Dropping {:?}: {}", entry.path, e),
                }
            }
            blocks
        } else {
            0
        }
    }

    /// Reads a file as text, refusing binary-by-name, oversized, and non-text content.
    fn read_text(&self, path: &Path, size: u64) -> Result<String, CoreError> {
        if self.rules.builtins.excludes_file(&display_name(path)) {
            return Err(CoreError::Binary(path.to_path_buf()));
        }
        self.check_size(path, size)?;

        // Never read more than one byte past the limit; the file may have
        // grown since it was stat'd.
        let mut bytes = Vec::new();
        fs::File::open(path)
            .and_then(|file| file.take(self.max_file_size + 1).read_to_end(&mut bytes))
            .map_err(|e| CoreError::Io(e, path.to_path_buf()))?;
        self.check_size(path, bytes.len() as u64)?;

        decode_text(bytes).ok_or_else(|| CoreError::Binary(path.to_path_buf()))
    }

    fn check_size(&self, path: &Path, size: u64) -> Result<(), CoreError> {
        if size > self.max_file_size {
            return Err(CoreError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_file_size,
            });
        }
        Ok(())
    }
}

fn push_file_block(out: &mut String, relative: &str, text: &str) {
    out.push_str("--- File: ");
    out.push_str(relative);
    out.push_str(" ---\n");
    out.push_str(text);
    out.push_str("\n\n");
}

fn push_placeholder(out: &mut String, relative: &str, error: &CoreError) {
    let line = match error {
        CoreError::Binary(_) => format!("--- Skipped binary file: {relative} ---"),
        CoreError::FileTooLarge { size, limit, .. } => {
            format!("--- Skipped oversized file: {relative} ({size} bytes, limit {limit}) ---")
        }
        _ => format!("--- Could not read file: {relative} ---"),
    };
    out.push_str(&line);
    out.push_str("\n\n");
}
