//! Path-based access into style trees.
//!
//! A path is a sequence of property names, e.g. `["spacing", "padding", "top"]`.
//! Paths only descend through [`StyleValue::Node`]s; lists and scalars are
//! always leaves.

use crate::types::{StyleTree, StyleValue};

/// An owned path into a style tree.
pub type StylePath = Vec<String>;

/// Builds an owned path from string slices.
pub fn path<S: AsRef<str>>(segments: &[S]) -> StylePath {
    segments.iter().map(|s| s.as_ref().to_string()).collect()
}

/// Returns the value at `path`, if every segment resolves.
pub fn traverse_get<'a, S: AsRef<str>>(tree: &'a StyleTree, path: &[S]) -> Option<&'a StyleValue> {
    let (first, rest) = path.split_first()?;
    let value = tree.get(first.as_ref())?;
    if rest.is_empty() {
        return Some(value);
    }
    traverse_get(value.as_node()?, rest)
}

/// Writes `value` at `path`, creating intermediate groups.
///
/// A scalar or list standing where a group is needed is replaced by one.
/// An empty path is ignored.
pub fn traverse_set<S: AsRef<str>>(tree: &mut StyleTree, path: &[S], value: StyleValue) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        tree.insert(first.as_ref().to_string(), value);
        return;
    }

    let child = tree
        .entry(first.as_ref().to_string())
        .or_insert_with(StyleValue::empty);
    if !child.is_node() {
        *child = StyleValue::empty();
    }
    if let StyleValue::Node(node) = child {
        traverse_set(node, rest, value);
    }
}

/// Removes and returns the value at `path`.
///
/// Groups left empty by the removal are removed as well.
pub fn traverse_delete<S: AsRef<str>>(tree: &mut StyleTree, path: &[S]) -> Option<StyleValue> {
    let (first, rest) = path.split_first()?;
    if rest.is_empty() {
        return tree.remove(first.as_ref());
    }

    let child = tree.get_mut(first.as_ref())?.as_node_mut()?;
    let removed = traverse_delete(child, rest);
    if removed.is_some() && child.is_empty() {
        tree.remove(first.as_ref());
    }
    removed
}

/// Lists every leaf of a tree with its path.
///
/// Scalars, lists and empty groups are leaves.
pub fn leaf_paths(tree: &StyleTree) -> Vec<(StylePath, &StyleValue)> {
    let mut leaves = Vec::new();
    collect_leaves(tree, &mut Vec::new(), &mut leaves);
    leaves
}

fn collect_leaves<'a>(
    tree: &'a StyleTree,
    prefix: &mut StylePath,
    out: &mut Vec<(StylePath, &'a StyleValue)>,
) {
    for (key, value) in tree {
        prefix.push(key.clone());
        match value {
            StyleValue::Node(node) if !node.is_empty() => collect_leaves(node, prefix, out),
            _ => out.push((prefix.clone(), value)),
        }
        prefix.pop();
    }
}
