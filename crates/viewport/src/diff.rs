//! Diffing incoming style snapshots against a block's inherited style.
//!
//! An edit at an active viewport arrives as the block's full style tree.
//! [`find_block_differences`] compares it with the style the viewport
//! inherits (everything except the pending edits made at that viewport) and
//! produces the complete pending delta for the viewport:
//!
//! - properties that differ become the viewport's unbounded change
//! - inherited properties missing from the snapshot become removes
//!
//! Because the delta is recomputed from scratch on every edit, a property
//! edited back to its inherited value, or re-added after a remove, leaves no
//! trace.
//!
//! A remove at viewport `v` of a property supplied by a lower viewport `u`
//! must not affect widths below `v`. Each such lower location gets a range
//! cap: a change at `(u, v - 1)` carrying the pre-removal value. Narrower
//! buckets of `u` that supply the property get a bounded change of their own
//! so the cap does not override them. Bounded changes are always derived
//! from the removes and rebuilt by [`regenerate_caps`] after every mutation.

use vcss::object::{
    StylePath, find_object_changes, find_removed_properties, leaf_paths, merge_objects,
    prune_empty, traverse_delete, traverse_get, traverse_set,
};
use vcss::types::BucketSet;
use vcss::{MaxWidth, StyleTree, StyleValue, Viewport};

use crate::state::BlockState;
use crate::valids::{buckets_at, inherited_style, recorded_viewports};

/// The pending delta of one viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockDelta {
    pub viewport: Viewport,
    /// Properties that differ from the inherited style.
    pub changes: StyleTree,
    /// Inherited properties missing from the snapshot, by bucket.
    pub removes: BucketSet,
}

impl BlockDelta {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.removes.values().all(StyleTree::is_empty)
    }

    /// Replaces the pending edits of the delta's viewport.
    ///
    /// Range caps are not touched; see [`regenerate_caps`].
    pub fn apply(self, block: &mut BlockState) {
        let viewport = self.viewport;
        block.changes.remove(viewport, MaxWidth::Unbounded);
        if !self.changes.is_empty() {
            block.changes.insert(viewport, MaxWidth::Unbounded, self.changes);
        }

        block.removes.remove_viewport(viewport);
        for (bucket, removed) in self.removes {
            if !removed.is_empty() {
                block.removes.insert(viewport, bucket, removed);
            }
        }
    }
}

/// Computes the pending delta at `viewport` for the snapshot `incoming`.
pub fn find_block_differences(block: &BlockState, incoming: &StyleTree, viewport: Viewport) -> BlockDelta {
    let inherited = inherited_style(block, viewport);

    let mut changes = find_object_changes(&inherited, incoming);
    prune_empty(&mut changes);

    let removed = find_removed_properties(&inherited, incoming);
    let mut removes = BucketSet::new();
    for (path, value) in leaf_paths(&removed) {
        // Only a save at the active viewport itself keeps its own bucket.
        let bucket = match find_viewport_set_occurrence(block, &path, viewport) {
            Some((origin, bucket)) if origin == viewport => bucket,
            _ => MaxWidth::Unbounded,
        };
        traverse_set(removes.entry(bucket).or_default(), &path, value.clone());
        if let MaxWidth::Bounded(upper) = bucket {
            if supplied_past(block, &path, viewport, upper) {
                traverse_set(removes.entry(MaxWidth::Unbounded).or_default(), &path, value.clone());
            }
        }
    }

    log::trace!(
        "Delta at {}px: {} changed, {} removed",
        viewport,
        changes.len(),
        removed.len()
    );
    BlockDelta {
        viewport,
        changes,
        removes,
    }
}

/// Finds the location that supplies `path` to `viewport`.
///
/// Scans viewports from `viewport` downward. Within a viewport only buckets
/// whose range contains `viewport` are considered, changes before saves and
/// each in ascending upper-bound order, which is the order in which they
/// override one another. Pending changes at `viewport` itself are skipped.
/// The first hit wins.
pub fn find_viewport_set_occurrence<S: AsRef<str>>(
    block: &BlockState,
    path: &[S],
    viewport: Viewport,
) -> Option<(Viewport, MaxWidth)> {
    let viewports = recorded_viewports(block);
    viewports.range(..=viewport).rev().find_map(|&origin| {
        supplying_bucket(block, origin, viewport, path, origin != viewport)
            .map(|(bucket, _)| (origin, bucket))
    })
}

/// The bucket of `origin` that supplies `path` at `width`, with its value.
fn supplying_bucket<'a, S: AsRef<str>>(
    block: &'a BlockState,
    origin: Viewport,
    width: Viewport,
    path: &[S],
    with_changes: bool,
) -> Option<(MaxWidth, &'a StyleValue)> {
    let buckets: Vec<MaxWidth> = buckets_at(block, origin)
        .into_iter()
        .filter(|bucket| bucket.covers(width))
        .collect();
    with_changes
        .then_some(&block.changes)
        .into_iter()
        .chain([&block.saves])
        .find_map(|set| {
            buckets.iter().find_map(|&bucket| {
                set.get(origin, bucket)
                    .and_then(|tree| traverse_get(tree, path))
                    .map(|value| (bucket, value))
            })
        })
}

/// Whether anything at or below `viewport` supplies `path` past `upper`.
fn supplied_past(block: &BlockState, path: &[String], viewport: Viewport, upper: Viewport) -> bool {
    let Some(width) = upper.checked_add(1) else {
        return false;
    };
    recorded_viewports(block)
        .range(..=viewport)
        .any(|&origin| supplying_bucket(block, origin, width, path, origin != viewport).is_some())
}

/// Whether a save, or an unbounded change, still supplies `path` at `viewport`.
fn is_supplied(block: &BlockState, path: &[String], viewport: Viewport) -> bool {
    let saved = block
        .saves
        .covering(viewport)
        .any(|(_, _, tree)| traverse_get(tree, path).is_some());
    let changed = block
        .changes
        .covering(viewport)
        .any(|(_, bucket, tree)| !bucket.is_bounded() && traverse_get(tree, path).is_some());
    saved || changed
}

/// Drops remove entries whose property nothing supplies any more.
///
/// Returns the number of leaves dropped.
pub fn prune_orphaned_removes(block: &mut BlockState) -> usize {
    let orphaned: Vec<(Viewport, MaxWidth, StylePath)> = block
        .removes
        .iter()
        .flat_map(|(viewport, bucket, tree)| {
            leaf_paths(tree)
                .into_iter()
                .map(move |(path, _)| (viewport, bucket, path))
        })
        .filter(|(viewport, _, path)| !is_supplied(block, path, *viewport))
        .collect();

    for (viewport, bucket, path) in &orphaned {
        log::debug!("Pruning orphaned remove {} at {}px", path.join("."), viewport);
        if let Some(tree) = block.removes.get_mut(*viewport, *bucket) {
            traverse_delete(tree, path);
        }
    }
    block.removes.prune();
    orphaned.len()
}

/// Rebuilds every range cap from the current removes.
///
/// For each viewport `v` with removes, every lower viewport `u` that
/// supplies a removed property at `v` gets a change at `(u, v - 1)` carrying
/// the value `u` showed just below `v`. Narrower buckets of `u` supplying the
/// same property get their own value copied into a change, so the cap only
/// stands in for the wider entries.
pub fn regenerate_caps(block: &mut BlockState) {
    let stale: Vec<(Viewport, Viewport)> = block.changes.bounded_buckets().collect();
    for (viewport, upper) in stale {
        block.changes.remove(viewport, MaxWidth::Bounded(upper));
    }

    // Highest owner first, so lower caps can copy from higher ones.
    let owners: Vec<Viewport> = block.removes.viewports().collect();
    for owner in owners.into_iter().rev() {
        let Some(cap @ MaxWidth::Bounded(cap_upper)) = MaxWidth::below(owner) else {
            continue;
        };
        let removed: Vec<StylePath> = block
            .removes
            .buckets(owner)
            .into_iter()
            .flat_map(|buckets| buckets.values())
            .flat_map(|tree| leaf_paths(tree).into_iter().map(|(path, _)| path))
            .collect();

        let lower: Vec<Viewport> = recorded_viewports(block).range(..owner).copied().collect();
        for origin in lower {
            let narrower: Vec<Viewport> = buckets_at(block, origin)
                .into_iter()
                .filter_map(|bucket| match bucket {
                    MaxWidth::Bounded(upper) if upper < cap_upper => Some(upper),
                    _ => None,
                })
                .collect();

            let mut copies: Vec<(MaxWidth, StyleTree)> = vec![(cap, StyleTree::new())];
            copies.extend(narrower.iter().map(|&upper| (MaxWidth::Bounded(upper), StyleTree::new())));

            for path in &removed {
                if supplying_bucket(block, origin, owner, path, true).is_none() {
                    continue;
                }
                for (bucket, tree) in copies.iter_mut() {
                    let MaxWidth::Bounded(upper) = *bucket else {
                        continue;
                    };
                    if *bucket != cap && !supplies_directly(block, origin, *bucket, path) {
                        continue;
                    }
                    if let Some((_, value)) = supplying_bucket(block, origin, upper, path, true) {
                        traverse_set(tree, path, value.clone());
                    }
                }
            }

            for (bucket, capped) in copies {
                if !capped.is_empty() {
                    log::trace!("Capping {}px at {:?} for removes at {}px", origin, bucket, owner);
                    merge_objects(block.changes.entry(origin, bucket), &capped);
                }
            }
        }
    }
}

fn supplies_directly(block: &BlockState, origin: Viewport, bucket: MaxWidth, path: &[String]) -> bool {
    [&block.saves, &block.changes]
        .into_iter()
        .any(|set| set.get(origin, bucket).is_some_and(|tree| traverse_get(tree, path).is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::style;
    use crate::valids::effective_style;
    use serde_json::json;
    use vcss::object::path;

    fn base_block(value: serde_json::Value) -> BlockState {
        let mut block = BlockState::default();
        block.saves.insert(0, MaxWidth::Unbounded, style(value));
        block
    }

    #[test]
    fn test_identical_snapshot_yields_empty_delta() {
        let block = base_block(json!({ "width": "100%" }));
        let delta = find_block_differences(&block, &style(json!({ "width": "100%" })), 1280);
        assert!(delta.is_empty());
    }

    #[test]
    fn test_changed_subtree_is_recorded() {
        let block = base_block(json!({ "padding": { "top": "1px", "left": "1px" } }));
        let incoming = style(json!({ "padding": { "top": "2px", "left": "1px" } }));
        let delta = find_block_differences(&block, &incoming, 768);
        assert_eq!(delta.changes, style(json!({ "padding": { "top": "2px" } })));
        assert!(delta.removes.is_empty());
    }

    #[test]
    fn test_arrays_replace_whole() {
        let block = base_block(json!({ "layers": ["a", "b"] }));
        let incoming = style(json!({ "layers": ["a", "c"] }));
        let delta = find_block_differences(&block, &incoming, 0);
        assert_eq!(delta.changes, style(json!({ "layers": ["a", "c"] })));
    }

    #[test]
    fn test_remove_of_lower_save_goes_to_unbounded_bucket() {
        let block = base_block(json!({ "width": "100%", "height": "auto" }));
        let delta = find_block_differences(&block, &style(json!({ "width": "100%" })), 768);
        assert_eq!(
            delta.removes.get(&MaxWidth::Unbounded),
            Some(&style(json!({ "height": "auto" })))
        );
    }

    #[test]
    fn test_occurrence_scans_down_from_viewport() {
        let mut block = base_block(json!({ "width": "100%" }));
        block
            .saves
            .insert(375, MaxWidth::Unbounded, style(json!({ "width": "50%" })));
        block
            .saves
            .insert(768, MaxWidth::Bounded(1279), style(json!({ "width": "10%" })));

        assert_eq!(find_viewport_set_occurrence(&block, &["width"], 500), Some((375, MaxWidth::Unbounded)));
        assert_eq!(find_viewport_set_occurrence(&block, &["width"], 800), Some((768, MaxWidth::Bounded(1279))));
        assert_eq!(find_viewport_set_occurrence(&block, &["width"], 1280), Some((375, MaxWidth::Unbounded)));
        assert_eq!(find_viewport_set_occurrence(&block, &["height"], 1280), None);
    }

    #[test]
    fn test_caps_copy_lower_values() {
        let mut block = base_block(json!({ "padding": { "top": "10px" }, "width": "1px" }));
        block
            .removes
            .insert(780, MaxWidth::Unbounded, style(json!({ "padding": { "top": "10px" } })));
        regenerate_caps(&mut block);
        assert_eq!(
            block.changes.get(0, MaxWidth::Bounded(779)),
            Some(&style(json!({ "padding": { "top": "10px" } })))
        );
    }

    #[test]
    fn test_bounded_origin_remove_reaches_wider_saves() {
        let mut block = base_block(json!({ "width": "100%" }));
        block
            .saves
            .insert(0, MaxWidth::Bounded(779), style(json!({ "width": "50%" })));

        let delta = find_block_differences(&block, &StyleTree::new(), 0);
        assert!(delta.removes.contains_key(&MaxWidth::Bounded(779)));
        assert!(delta.removes.contains_key(&MaxWidth::Unbounded));
    }

    #[test]
    fn test_bounded_origin_remove_stays_in_bucket() {
        let mut block = base_block(json!({ "height": "auto" }));
        block
            .saves
            .insert(0, MaxWidth::Bounded(779), style(json!({ "width": "50%" })));

        let delta = find_block_differences(&block, &style(json!({ "height": "auto" })), 0);
        assert_eq!(
            delta.removes.get(&MaxWidth::Bounded(779)),
            Some(&style(json!({ "width": "50%" })))
        );
        assert!(!delta.removes.contains_key(&MaxWidth::Unbounded));
    }

    #[test]
    fn test_occurrence_prefers_narrower_bucket() {
        let mut block = base_block(json!({ "width": "100%" }));
        block
            .saves
            .insert(0, MaxWidth::Bounded(779), style(json!({ "width": "50%" })));

        assert_eq!(find_viewport_set_occurrence(&block, &["width"], 500), Some((0, MaxWidth::Bounded(779))));
        assert_eq!(find_viewport_set_occurrence(&block, &["width"], 780), Some((0, MaxWidth::Unbounded)));
    }

    #[test]
    fn test_caps_leave_narrower_buckets_intact() {
        let mut block = base_block(json!({ "width": "100%" }));
        block
            .saves
            .insert(0, MaxWidth::Bounded(374), style(json!({ "width": "10%" })));
        block
            .removes
            .insert(780, MaxWidth::Unbounded, style(json!({ "width": "100%" })));
        regenerate_caps(&mut block);

        assert_eq!(block.changes.get(0, MaxWidth::Bounded(779)), Some(&style(json!({ "width": "100%" }))));
        assert_eq!(block.changes.get(0, MaxWidth::Bounded(374)), Some(&style(json!({ "width": "10%" }))));
        assert_eq!(effective_style(&block, 0), style(json!({ "width": "10%" })));
        assert_eq!(effective_style(&block, 500), style(json!({ "width": "100%" })));
        assert_eq!(effective_style(&block, 780), StyleTree::new());
    }

    #[test]
    fn test_orphaned_removes_are_pruned() {
        let mut block = base_block(json!({ "width": "1px" }));
        block
            .removes
            .insert(768, MaxWidth::Unbounded, style(json!({ "width": "1px", "height": "2px" })));
        assert_eq!(prune_orphaned_removes(&mut block), 1);
        let remaining = block.removes.style(768).cloned().unwrap_or_default();
        assert!(traverse_get(&remaining, &path(&["height"])).is_none());
        assert!(traverse_get(&remaining, &path(&["width"])).is_some());
    }
}
