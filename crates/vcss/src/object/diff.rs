//! Structural comparison of style trees.

use crate::types::{StyleTree, StyleValue};

/// Properties of `incoming` that are new or differ from `base`.
///
/// Groups on both sides are compared key by key; any other difference
/// (scalar change, list change, or a type change) yields the whole
/// incoming value at that key.
pub fn find_object_changes(base: &StyleTree, incoming: &StyleTree) -> StyleTree {
    let mut changes = StyleTree::new();
    for (key, value) in incoming {
        match (base.get(key), value) {
            (Some(StyleValue::Node(previous)), StyleValue::Node(next)) => {
                let nested = find_object_changes(previous, next);
                if !nested.is_empty() {
                    changes.insert(key.clone(), StyleValue::Node(nested));
                }
            }
            (Some(previous), next) if previous == next => {}
            _ => {
                changes.insert(key.clone(), value.clone());
            }
        }
    }
    changes
}

/// Properties of `base` that `incoming` no longer carries, with their `base` values.
///
/// A key whose value merely changed type is a change, not a removal.
pub fn find_removed_properties(base: &StyleTree, incoming: &StyleTree) -> StyleTree {
    let mut removed = StyleTree::new();
    for (key, value) in base {
        match (value, incoming.get(key)) {
            (_, None) => {
                removed.insert(key.clone(), value.clone());
            }
            (StyleValue::Node(previous), Some(StyleValue::Node(next))) => {
                let nested = find_removed_properties(previous, next);
                if !nested.is_empty() {
                    removed.insert(key.clone(), StyleValue::Node(nested));
                }
            }
            _ => {}
        }
    }
    removed
}

/// Properties carried with identical values by both trees.
pub fn find_equal_properties(left: &StyleTree, right: &StyleTree) -> StyleTree {
    let mut equal = StyleTree::new();
    for (key, value) in left {
        match (value, right.get(key)) {
            (StyleValue::Node(l), Some(StyleValue::Node(r))) => {
                let nested = find_equal_properties(l, r);
                if !nested.is_empty() {
                    equal.insert(key.clone(), StyleValue::Node(nested));
                }
            }
            (l, Some(r)) if l == r => {
                equal.insert(key.clone(), value.clone());
            }
            _ => {}
        }
    }
    equal
}
