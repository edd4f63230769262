//! Transforms a walked tree and the selection into a view model for the shell.

use serde::Serialize;
use std::path::PathBuf;

use super::state::SelectionSet;
use crate::core::EntryDescriptor;

/// A serializable representation of a single node in the file tree.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    pub relative_path: String,
    pub is_directory: bool,
    /// The node itself is staged.
    pub is_selected: bool,
    /// An ancestor is staged, so the node's content is copied with it.
    pub is_inherited: bool,
    pub children: Vec<TreeNode>,
}

/// Builds the view of `tree`. The inherited flag is threaded downward, so no
/// node needs a reference to its parent.
pub fn build_tree_view(tree: &EntryDescriptor, selection: &SelectionSet) -> TreeNode {
    build_node(tree, selection, false)
}

fn build_node(entry: &EntryDescriptor, selection: &SelectionSet, inherited: bool) -> TreeNode {
    let is_selected = selection.contains(&entry.path);
    let children_inherit = inherited || is_selected;

    TreeNode {
        name: entry.name.clone(),
        path: entry.path.clone(),
        relative_path: entry.relative_path.clone(),
        is_directory: entry.is_directory(),
        is_selected,
        is_inherited: inherited,
        children: entry
            .children
            .iter()
            .map(|child| build_node(child, selection, children_inherit))
            .collect(),
    }
}

/// Counts staged nodes visible in the view.
pub fn count_selected(node: &TreeNode) -> usize {
    usize::from(node.is_selected) + node.children.iter().map(count_selected).sum::<usize>()
}
