//! Decides, per entry, whether it is excluded from trees and copies.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use super::pattern::{self, IgnoreRule};
use super::{CoreError, EntryKind};
use crate::utils::file_detection::{
    has_binary_extension, IGNORED_DIRS, IGNORED_EXTENSIONS, IGNORED_FILE_NAMES,
};

/// Hardcoded exclusions. Custom rules can never override these.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinExclusions {
    pub directories: &'static [&'static str],
    pub file_names: &'static [&'static str],
    pub extensions: &'static [&'static str],
}

impl Default for BuiltinExclusions {
    fn default() -> Self {
        Self {
            directories: IGNORED_DIRS,
            file_names: IGNORED_FILE_NAMES,
            extensions: IGNORED_EXTENSIONS,
        }
    }
}

impl BuiltinExclusions {
    /// Directory whose base name is on the exclusion list.
    pub fn excludes_directory(&self, name: &str) -> bool {
        self.directories.iter().any(|dir| *dir == name)
    }

    /// File excluded by exact name or by (case-insensitive) extension.
    pub fn excludes_file(&self, name: &str) -> bool {
        self.file_names.iter().any(|file| *file == name)
            || has_binary_extension(name, self.extensions)
    }
}

/// Decides whether an entry is excluded.
///
/// Built-in directory and file exclusions are absolute. Custom rules are folded
/// left to right in declaration order; each matching rule sets the state to
/// "ignored" unless it is a negation, so the last match wins.
pub fn should_ignore(
    name: &str,
    kind: EntryKind,
    relative_path: &str,
    builtins: &BuiltinExclusions,
    rules: &[IgnoreRule],
) -> bool {
    match kind {
        EntryKind::Directory if builtins.excludes_directory(name) => return true,
        EntryKind::File if builtins.excludes_file(name) => return true,
        _ => {}
    }

    rules.iter().fold(false, |ignored, rule| {
        if rule.matches(name, kind, relative_path) {
            !rule.is_negation
        } else {
            ignored
        }
    })
}

/// The complete rule set for one root: built-ins plus the root's custom rules.
///
/// A `RuleSet` is immutable; reloading a root produces a new one, so a traversal
/// holding an older set keeps a consistent view.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub builtins: BuiltinExclusions,
    pub rules: Vec<IgnoreRule>,
    /// Root-relative path of the rule file; the file itself is never listed.
    pub rule_file: Option<String>,
}

impl RuleSet {
    pub fn new(builtins: BuiltinExclusions, rules: Vec<IgnoreRule>) -> Self {
        Self {
            builtins,
            rules,
            rule_file: None,
        }
    }

    /// Built-ins plus the custom rules read from `root/<rule_file_name>`.
    pub fn load(root: &Path, rule_file_name: &str) -> Self {
        Self {
            builtins: BuiltinExclusions::default(),
            rules: pattern::load_rules(root, rule_file_name),
            rule_file: Some(rule_file_name.to_string()),
        }
    }

    pub fn should_ignore(&self, name: &str, kind: EntryKind, relative_path: &str) -> bool {
        if kind == EntryKind::File && self.rule_file.as_deref() == Some(relative_path) {
            return true;
        }
        should_ignore(name, kind, relative_path, &self.builtins, &self.rules)
    }

    /// The only check applied when rendering the unfiltered structure.
    pub fn excludes_builtin_directory(&self, name: &str, kind: EntryKind) -> bool {
        kind.is_directory() && self.builtins.excludes_directory(name)
    }
}

/// Builds the `GlobSet` of root-relative paths whose change events the watcher
/// drops: anything inside a built-in excluded directory, and dotfiles.
pub fn build_watch_globset(builtins: &BuiltinExclusions) -> Result<GlobSet, CoreError> {
    let mut builder = GlobSetBuilder::new();

    for dir in builtins.directories {
        // The directory itself and everything below it.
        builder.add(Glob::new(&format!("**/{}", dir))?);
        builder.add(Glob::new(&format!("**/{}/**", dir))?);
    }
    builder.add(Glob::new("**/.*")?);

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pattern::{compile, parse_rules};
    use proptest::prelude::*;

    fn custom(lines: &str) -> RuleSet {
        RuleSet::new(BuiltinExclusions::default(), parse_rules(lines))
    }

    #[test]
    fn test_builtin_directories_cannot_be_overridden() {
        let rules = custom("!node_modules\n!.git/\n!**");
        for dir in IGNORED_DIRS {
            assert!(
                rules.should_ignore(dir, EntryKind::Directory, dir),
                "{dir} should stay ignored"
            );
        }
    }

    #[test]
    fn test_builtin_directory_names_do_not_hide_files() {
        let rules = RuleSet::default();
        assert!(!rules.should_ignore("build", EntryKind::File, "build"));
        assert!(rules.should_ignore("build", EntryKind::Directory, "build"));
    }

    #[test]
    fn test_builtin_files_and_extensions() {
        let rules = custom("!Cargo.lock\n!*.PNG");
        assert!(rules.should_ignore("Cargo.lock", EntryKind::File, "Cargo.lock"));
        assert!(rules.should_ignore("Logo.PNG", EntryKind::File, "assets/Logo.PNG"));
        assert!(!rules.should_ignore("Cargo.toml", EntryKind::File, "Cargo.toml"));
    }

    #[test]
    fn test_last_matching_rule_wins() {
        let rules = custom("*.log\n!keep.log");
        assert!(rules.should_ignore("a.log", EntryKind::File, "a.log"));
        assert!(!rules.should_ignore("keep.log", EntryKind::File, "keep.log"));
        assert!(!rules.should_ignore("b.txt", EntryKind::File, "b.txt"));

        let reordered = custom("!keep.log\n*.log");
        assert!(reordered.should_ignore("keep.log", EntryKind::File, "keep.log"));
    }

    #[test]
    fn test_double_star_rules_apply_at_every_depth() {
        let rules = custom("**/*.log\n**/secret.txt");
        assert!(rules.should_ignore("a.log", EntryKind::File, "a.log"));
        assert!(rules.should_ignore("a.log", EntryKind::File, "src/a.log"));
        assert!(rules.should_ignore("secret.txt", EntryKind::File, "secret.txt"));
        assert!(rules.should_ignore("secret.txt", EntryKind::File, "config/secret.txt"));
        assert!(!rules.should_ignore("notes.txt", EntryKind::File, "notes.txt"));
    }

    #[test]
    fn test_non_matching_rules_keep_state() {
        let rules = custom("*.log\n!*.md");
        assert!(rules.should_ignore("a.log", EntryKind::File, "a.log"));
    }

    #[test]
    fn test_loaded_rule_file_hides_itself() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".codecopierignore"), "*.log\n").unwrap();
        let rules = RuleSet::load(dir.path(), ".codecopierignore");

        assert_eq!(rules.rules.len(), 1);
        assert!(rules.should_ignore(".codecopierignore", EntryKind::File, ".codecopierignore"));
        assert!(!rules.should_ignore(".codecopierignore", EntryKind::File, "sub/.codecopierignore"));
    }

    #[test]
    fn test_unfiltered_check_only_sees_directories() {
        let rules = custom("*.rs");
        assert!(rules.excludes_builtin_directory("target", EntryKind::Directory));
        assert!(!rules.excludes_builtin_directory("main.rs", EntryKind::File));
        assert!(!rules.excludes_builtin_directory("Cargo.lock", EntryKind::File));
    }

    #[test]
    fn test_watch_globset_drops_excluded_paths() {
        let set = build_watch_globset(&BuiltinExclusions::default()).unwrap();
        assert!(set.is_match("node_modules/pkg/index.js"));
        assert!(set.is_match("crates/core/target"));
        assert!(set.is_match(".env.local"));
        assert!(!set.is_match("src/main.rs"));
    }

    proptest! {
        #[test]
        fn prop_resolution_equals_left_fold(
            picks in prop::collection::vec((0usize..4, any::<bool>()), 0..8),
            name_idx in 0usize..3,
        ) {
            let globs = ["*.log", "keep.*", "a*", "*"];
            let names = ["a.log", "keep.log", "b.txt"];
            let lines: Vec<String> = picks
                .iter()
                .map(|(g, neg)| format!("{}{}", if *neg { "!" } else { "" }, globs[*g]))
                .collect();
            let rules: Vec<IgnoreRule> = lines.iter().map(|l| compile(l)).collect();
            let name = names[name_idx];

            let mut expected = false;
            for rule in &rules {
                if rule.matches(name, EntryKind::File, name) {
                    expected = !rule.is_negation;
                }
            }
            let actual = should_ignore(
                name,
                EntryKind::File,
                name,
                &BuiltinExclusions::default(),
                &rules,
            );
            prop_assert_eq!(actual, expected);
        }
    }
}
