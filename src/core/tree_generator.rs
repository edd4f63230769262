//! Renders an ASCII diagram of a directory tree.

use std::cmp::Ordering;

use super::EntryDescriptor;

/// A utility struct for generating an ASCII directory tree.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeGenerator;

impl TreeGenerator {
    /// Renders `tree` as a connector diagram, starting with a `<name>/` line.
    ///
    /// Siblings are re-sorted here (directories first, then case-insensitive
    /// by name), independently of the order the walker produced.
    pub fn render(tree: &EntryDescriptor) -> String {
        let mut result = format!("{}/\n", tree.name);
        Self::render_children(&tree.children, &mut result, "");
        result
    }

    fn render_children(children: &[EntryDescriptor], result: &mut String, prefix: &str) {
        let mut sorted: Vec<&EntryDescriptor> = children.iter().collect();
        sorted.sort_by(|a, b| compare_for_display(a, b));

        for (i, node) in sorted.iter().enumerate() {
            let is_last = i == sorted.len() - 1;
            let connector = if is_last { "└── " } else { "├── " };
            let suffix = if node.is_directory() { "/" } else { "" };

            result.push_str(&format!("{prefix}{connector}{}{suffix}\n", node.name));

            if !node.children.is_empty() {
                let new_prefix = if is_last {
                    format!("{prefix}    ")
                } else {
                    format!("{prefix}│   ")
                };
                Self::render_children(&node.children, result, &new_prefix);
            }
        }
    }
}

/// Directories first, then case-insensitive name; exact name breaks ties so
/// the output is deterministic.
fn compare_for_display(a: &EntryDescriptor, b: &EntryDescriptor) -> Ordering {
    b.is_directory()
        .cmp(&a.is_directory())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}
