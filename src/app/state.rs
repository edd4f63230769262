//! Defines the session state shared by the command handlers.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::AppConfig;
use crate::core::{EntryKind, RuleSet};

/// Metadata kept for a staged path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedItem {
    pub name: String,
    pub kind: EntryKind,
}

/// The paths the user has explicitly staged for copying, in staging order.
///
/// Membership is never checked against the ignore rules; stale paths are only
/// discovered when the selection is read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionSet {
    items: IndexMap<PathBuf, SelectedItem>,
}

impl SelectionSet {
    /// Stages `path`. Returns `false` if it was already staged.
    pub fn stage(&mut self, path: PathBuf, item: SelectedItem) -> bool {
        if self.items.contains_key(&path) {
            return false;
        }
        self.items.insert(path, item);
        true
    }

    /// Removes `path`, keeping the order of the remaining items.
    pub fn unstage(&mut self, path: &Path) -> bool {
        self.items.shift_remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.items.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Holds the state of one session.
///
/// Wrapped in an `Arc<Mutex<...>>` so command handlers running on different
/// tasks serialize their writes to the selection and the rule set.
#[derive(Debug, Default)]
pub struct AppState {
    pub config: AppConfig,
    /// The currently opened root, if any.
    pub root: Option<PathBuf>,
    /// Rules loaded for `root`. Replaced wholesale on open and refresh.
    pub rules: Arc<RuleSet>,
    pub selection: SelectionSet,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the rules for `root`: the cached set if `root` is the open
    /// root, otherwise a freshly loaded one.
    pub fn rules_for(&self, root: &Path) -> Arc<RuleSet> {
        if self.root.as_deref() == Some(root) {
            self.rules.clone()
        } else {
            Arc::new(RuleSet::load(root, &self.config.rule_file_name))
        }
    }

    /// Clears everything tied to the open root.
    pub fn reset_root_state(&mut self) {
        self.root = None;
        self.rules = Arc::new(RuleSet::default());
        self.selection.clear();
    }
}

/// Locks the shared state, recovering it from a poisoned lock.
pub fn lock_state(state: &Mutex<AppState>) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_item(name: &str) -> SelectedItem {
        SelectedItem {
            name: name.to_string(),
            kind: EntryKind::File,
        }
    }

    #[test]
    fn test_stage_is_unique_and_ordered() {
        let mut selection = SelectionSet::default();

        assert!(selection.stage(PathBuf::from("/p/b.txt"), file_item("b.txt")));
        assert!(selection.stage(PathBuf::from("/p/a.txt"), file_item("a.txt")));
        assert!(!selection.stage(PathBuf::from("/p/b.txt"), file_item("b.txt")));

        assert_eq!(
            selection.paths(),
            vec![PathBuf::from("/p/b.txt"), PathBuf::from("/p/a.txt")]
        );
    }

    #[test]
    fn test_unstage_keeps_order() {
        let mut selection = SelectionSet::default();
        for name in ["a", "b", "c"] {
            selection.stage(PathBuf::from(name), file_item(name));
        }

        assert!(selection.unstage(Path::new("a")));
        assert!(!selection.unstage(Path::new("a")));

        assert_eq!(selection.paths(), vec![PathBuf::from("b"), PathBuf::from("c")]);
    }

    #[test]
    fn test_reset_root_state_clears_selection() {
        let mut state = AppState::default();
        state.root = Some(PathBuf::from("/p"));
        state.selection.stage(PathBuf::from("/p/a"), file_item("a"));

        state.reset_root_state();

        assert!(state.root.is_none());
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_rules_for_other_root_loads_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".codecopierignore"), "*.log\n").unwrap();
        let state = AppState::default();

        let rules = state.rules_for(dir.path());

        assert_eq!(rules.rules.len(), 1);
        assert!(state.rules.rules.is_empty());
    }
}
