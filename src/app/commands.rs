//! Contains the boundary operations exposed to the shell.
//!
//! Tree operations return `None` when the root cannot be walked. Copy and
//! staging operations never fail outright: every failure is reported as a
//! [`Status`]. Traversals run on the blocking pool and read the rule set as
//! it was when they started.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::clipboard::ClipboardSink;
use super::events::Status;
use super::file_dialog::DialogService;
use super::git::{GitError, GitService};
use super::state::{lock_state, AppState, SelectedItem};
use super::view_model::{build_tree_view, TreeNode};
use crate::core::{
    display_name, CoreError, DirectoryScanner, EntryDescriptor, EntryKind, FileHandler, RuleSet,
    TreeGenerator, WalkMode,
};

/// Asks the picker for a directory and opens it. `None` if cancelled or inaccessible.
pub async fn open_root<D: DialogService + ?Sized>(
    dialog: &D,
    state: Arc<Mutex<AppState>>,
) -> Option<EntryDescriptor> {
    match dialog.pick_directory() {
        Some(path) => open_root_at(path, state).await,
        None => {
            tracing::info!("User cancelled directory selection.");
            None
        }
    }
}

/// Opens `path` as the new root: loads its rules, walks it, and clears the selection.
pub async fn open_root_at(path: PathBuf, state: Arc<Mutex<AppState>>) -> Option<EntryDescriptor> {
    if !path.is_dir() {
        tracing::warn!("Cannot open {:?}: not a directory", path);
        return None;
    }
    let rule_file_name = lock_state(&state).config.rule_file_name.clone();

    let (rules, tree) = scan_with_fresh_rules(path.clone(), rule_file_name).await?;

    let mut guard = lock_state(&state);
    guard.reset_root_state();
    guard.root = Some(path.clone());
    guard.rules = rules;
    guard.config.last_directory = Some(path.clone());
    tracing::info!("Opened root {:?}", path);
    Some(tree)
}

/// Re-reads the rule file and re-walks `root`. The selection is kept.
pub async fn refresh_tree(root: &Path, state: Arc<Mutex<AppState>>) -> Option<EntryDescriptor> {
    let rule_file_name = lock_state(&state).config.rule_file_name.clone();

    let (rules, tree) = scan_with_fresh_rules(root.to_path_buf(), rule_file_name).await?;

    let mut guard = lock_state(&state);
    if guard.root.as_deref() == Some(root) {
        guard.rules = rules;
    }
    Some(tree)
}

/// Walks `root` applying only the built-in directory exclusions.
pub async fn get_unfiltered_structure(
    root: &Path,
    state: Arc<Mutex<AppState>>,
) -> Option<EntryDescriptor> {
    let rules = lock_state(&state).rules_for(root);
    let root = root.to_path_buf();

    run_blocking(move || DirectoryScanner::new(rules).scan_root(&root, WalkMode::Unfiltered))
        .await
        .ok()
        .flatten()
}

/// Aggregates `paths` relative to `root` and puts the text on the clipboard.
pub async fn copy_selection(
    paths: Vec<PathBuf>,
    root: &Path,
    state: Arc<Mutex<AppState>>,
    clipboard: &dyn ClipboardSink,
) -> Status {
    if !root.is_dir() {
        return Status::Error(CoreError::NotADirectory(root.to_path_buf()).to_string());
    }
    let (rules, max_file_size) = {
        let guard = lock_state(&state);
        (guard.rules_for(root), guard.config.max_file_size_bytes)
    };
    let root = root.to_path_buf();

    let result = match run_blocking(move || {
        FileHandler::new(rules, max_file_size).aggregate(&paths, &root)
    })
    .await
    {
        Ok(result) => result,
        Err(e) => return Status::Error(e.to_string()),
    };

    if !result.has_content() {
        return Status::Info("No text content found.".to_string());
    }
    if let Err(e) = clipboard.write_text(&result.content) {
        tracing::error!("Clipboard write failed: {:#}", e);
        return Status::Error(e.to_string());
    }
    Status::Success(format!(
        "Success! Copied {} items ({} chars).",
        result.included_items,
        format_count(result.char_count())
    ))
}

/// Renders the unfiltered structure of `root` and puts it on the clipboard.
pub async fn copy_structure(
    root: &Path,
    state: Arc<Mutex<AppState>>,
    clipboard: &dyn ClipboardSink,
) -> Status {
    let Some(tree) = get_unfiltered_structure(root, state).await else {
        return Status::Error(CoreError::NotADirectory(root.to_path_buf()).to_string());
    };

    let diagram = TreeGenerator::render(&tree);
    match clipboard.write_text(&diagram) {
        Ok(()) => Status::Success("Copied directory structure.".to_string()),
        Err(e) => Status::Error(e.to_string()),
    }
}

/// Stages `path` and returns the selection size.
pub fn stage_item(path: PathBuf, item: SelectedItem, state: &Mutex<AppState>) -> usize {
    let mut guard = lock_state(state);
    if !guard.selection.stage(path.clone(), item) {
        tracing::debug!("{:?} is already staged", path);
    }
    guard.selection.len()
}

/// Unstages `path` and returns the selection size.
pub fn unstage_item(path: &Path, state: &Mutex<AppState>) -> usize {
    let mut guard = lock_state(state);
    guard.selection.unstage(path);
    guard.selection.len()
}

/// The open tree annotated with the current selection.
pub fn tree_view(tree: &EntryDescriptor, state: &Mutex<AppState>) -> TreeNode {
    build_tree_view(tree, &lock_state(state).selection)
}

/// Stages every file git reports as staged under the open root.
pub async fn stage_git_staged(git: &dyn GitService, state: Arc<Mutex<AppState>>) -> Status {
    let Some(root) = lock_state(&state).root.clone() else {
        return Status::Error("No folder is open.".to_string());
    };

    let files = match git.staged_files(&root).await {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("Could not list staged files under {:?}: {}", root, e);
            Vec::new()
        }
    };
    if files.is_empty() {
        return Status::Info("No staged files found".to_string());
    }

    let mut guard = lock_state(&state);
    let added = files
        .into_iter()
        .filter(|path| {
            let item = SelectedItem {
                name: display_name(path),
                kind: EntryKind::File,
            };
            guard.selection.stage(path.clone(), item)
        })
        .count();

    if added > 0 {
        Status::Info(format!("Added {added} staged files"))
    } else {
        Status::Info("Files already selected".to_string())
    }
}

/// Puts the staged diff of `root` on the clipboard.
pub async fn copy_git_diff(
    git: &dyn GitService,
    root: &Path,
    clipboard: &dyn ClipboardSink,
) -> Status {
    let diff = match git.staged_diff(root).await {
        Ok(diff) => diff,
        Err(GitError::Oversized { limit }) => {
            return Status::Error(format!(
                "Staged content is too large (>{}MB). Unstage large files like lock-files.",
                limit / (1024 * 1024)
            ));
        }
        Err(e) => {
            tracing::error!("git diff failed under {:?}: {}", root, e);
            return Status::Error("Git error. Check terminal for details.".to_string());
        }
    };

    if diff.trim().is_empty() {
        return Status::Info("No staged changes. (Did you run 'git add'?)".to_string());
    }
    match clipboard.write_text(&diff) {
        Ok(()) => Status::Success("Copied staged changes to clipboard".to_string()),
        Err(e) => Status::Error(e.to_string()),
    }
}

async fn scan_with_fresh_rules(
    root: PathBuf,
    rule_file_name: String,
) -> Option<(Arc<RuleSet>, EntryDescriptor)> {
    run_blocking(move || {
        let rules = Arc::new(RuleSet::load(&root, &rule_file_name));
        DirectoryScanner::new(rules.clone())
            .scan_root(&root, WalkMode::Filtered)
            .map(|tree| (rules, tree))
    })
    .await
    .ok()
    .flatten()
}

async fn run_blocking<T, F>(work: F) -> Result<T, CoreError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!("Blocking traversal failed: {}", e);
        CoreError::from(e)
    })
}

/// Formats `n` with `,` thousands separators.
fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
