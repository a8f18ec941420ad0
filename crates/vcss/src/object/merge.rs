//! Deep merge and subtraction of style trees.
//!
//! These follow CSS inheritance between breakpoints: groups merge key by
//! key, while scalars and lists replace whatever was inherited.

use crate::types::{StyleTree, StyleValue};

/// Layers `overlay` on top of `base`.
pub fn merge_objects(base: &mut StyleTree, overlay: &StyleTree) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(StyleValue::Node(existing)), StyleValue::Node(incoming)) => {
                merge_objects(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Removes from `tree` every property present in `removal`.
///
/// Groups present on both sides are subtracted recursively and dropped
/// once empty; any other shared key is removed outright.
pub fn subtract_object(tree: &mut StyleTree, removal: &StyleTree) {
    for (key, removed) in removal {
        let drop_key = match (tree.get_mut(key), removed) {
            (Some(StyleValue::Node(existing)), StyleValue::Node(removed)) => {
                subtract_object(existing, removed);
                existing.is_empty()
            }
            (Some(_), _) => true,
            (None, _) => false,
        };
        if drop_key {
            tree.remove(key);
        }
    }
}

/// Drops empty groups at every depth.
pub fn prune_empty(tree: &mut StyleTree) {
    tree.retain(|_, value| match value {
        StyleValue::Node(node) => {
            prune_empty(node);
            !node.is_empty()
        }
        _ => true,
    });
}
