//! Compiles glob-style ignore rules into matchers.
//!
//! The supported syntax is a deliberately small subset of `.gitignore`:
//!
//! * `!` prefix negates the rule (re-includes a previously ignored entry),
//! * a `/` anywhere but at the end makes the rule match the path relative to
//!   the root instead of the base name,
//! * a single leading `/` and a single trailing `/` are structural; a trailing
//!   `/` restricts the rule to directories,
//! * `**` matches across separators and `**/` also matches no directory at
//!   all, `*` matches within one segment, `?` exactly one non-separator
//!   character.
//!
//! Every rule matches either the whole candidate or any suffix of it that
//! starts after a `/`.

use regex::Regex;
use std::fs;
use std::path::Path;

use super::EntryKind;

/// A single compiled ignore rule.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    /// The original line, as written in the rule file.
    pub pattern: String,
    /// `None` when the expression exceeded the regex engine's limits.
    matcher: Option<Regex>,
    pub is_negation: bool,
    pub matches_full_path: bool,
    pub directory_only: bool,
}

impl IgnoreRule {
    /// Tests the rule against an entry. Path-shaped rules see the relative
    /// path, all others only the base name.
    pub fn matches(&self, name: &str, kind: EntryKind, relative_path: &str) -> bool {
        if self.directory_only && !kind.is_directory() {
            return false;
        }
        let candidate = if self.matches_full_path {
            relative_path
        } else {
            name
        };
        self.matcher.as_ref().is_some_and(|re| re.is_match(candidate))
    }
}

/// Compiles one trimmed, non-comment rule line.
///
/// Never fails. Everything but the wildcards is escaped, so only an expression
/// too large for the regex engine is rejected; such a rule matches nothing.
pub fn compile(rule_text: &str) -> IgnoreRule {
    let (is_negation, body) = match rule_text.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, rule_text),
    };

    let without_trailing = body.strip_suffix('/');
    let directory_only = without_trailing.is_some();
    let matches_full_path = without_trailing.unwrap_or(body).contains('/');

    let body = body.strip_prefix('/').unwrap_or(body);
    let body = body.strip_suffix('/').unwrap_or(body);

    let expression = format!("^(?:.*/)?{}$", translate_glob(body));
    let matcher = match Regex::new(&expression) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Rule '{}' could not be compiled ({}); it matches nothing", rule_text, e);
            None
        }
    };

    IgnoreRule {
        pattern: rule_text.to_string(),
        matcher,
        is_negation,
        matches_full_path,
        directory_only,
    }
}

/// Escapes regex metacharacters and translates glob wildcards.
fn translate_glob(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                // `**/` may also stand for no directory at all.
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    out
}

/// Parses rule-file text into compiled rules, in declaration order.
/// Blank lines and `#` comments are skipped.
pub fn parse_rules(text: &str) -> Vec<IgnoreRule> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(compile)
        .collect()
}

/// Loads the rule file `file_name` from `root`. A missing file means no rules;
/// an unreadable one is logged and also means no rules.
pub fn load_rules(root: &Path, file_name: &str) -> Vec<IgnoreRule> {
    let rule_path = root.join(file_name);
    match fs::read_to_string(&rule_path) {
        Ok(text) => {
            let rules = parse_rules(&text);
            tracing::info!("Loaded {} ignore rules from {:?}", rules.len(), rule_path);
            rules
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read rule file {:?}: {}", rule_path, e);
            Vec::new()
        }
    }
}
