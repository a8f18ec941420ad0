//! Projection of a block's saves, changes and removes into valids.
//!
//! The effective style at a pixel width is a cascade over every
//! `(viewport, bucket)` location whose range contains that width:
//!
//! ```text
//! for viewport in ascending order (<= width):
//!     for bucket covering width, widest first:
//!         merge saves[viewport][bucket]
//!     for bucket covering width, widest first:
//!         merge changes[viewport][bucket]
//!     for bucket covering width:
//!         subtract removes[viewport][bucket]
//! ```
//!
//! Inside its range a bounded bucket overrides the wider buckets of the same
//! viewport, and pending changes override the saves they sit on. A bounded
//! bucket only contributes inside its pixel range, so widths past it fall
//! back to the wider entries.

use std::collections::BTreeSet;

use vcss::object::{merge_objects, subtract_object};
use vcss::{MaxWidth, StyleTree, Viewport, ViewportStyleSet};

use crate::breakpoints::Breakpoints;
use crate::state::BlockState;

/// The fully cascaded style of `block` at pixel width `width`.
pub fn effective_style(block: &BlockState, width: Viewport) -> StyleTree {
    cascade(block, width, None)
}

/// The style inherited at `viewport` from everything but the pending edits
/// made at `viewport` itself.
///
/// Changes and removes recorded at `viewport` are left out; saves at
/// `viewport` are kept.
pub fn inherited_style(block: &BlockState, viewport: Viewport) -> StyleTree {
    cascade(block, viewport, Some(viewport))
}

fn cascade(block: &BlockState, width: Viewport, exclude_pending: Option<Viewport>) -> StyleTree {
    let mut style = StyleTree::new();

    for viewport in recorded_viewports(block).range(..=width) {
        let viewport = *viewport;
        let pending = exclude_pending != Some(viewport);

        let covering: Vec<MaxWidth> = buckets_at(block, viewport)
            .into_iter()
            .rev()
            .filter(|bucket| bucket.covers(width))
            .collect();
        for bucket in &covering {
            if let Some(saved) = block.saves.get(viewport, *bucket) {
                merge_objects(&mut style, saved);
            }
        }
        if pending {
            for bucket in &covering {
                if let Some(changed) = block.changes.get(viewport, *bucket) {
                    merge_objects(&mut style, changed);
                }
            }
        }

        if pending {
            if let Some(buckets) = block.removes.buckets(viewport) {
                for (bucket, removed) in buckets {
                    if bucket.covers(width) {
                        subtract_object(&mut style, removed);
                    }
                }
            }
        }
    }

    log::trace!("Cascaded {} properties at {}px", style.len(), width);
    style
}

/// Viewports holding any save, change or remove.
pub(crate) fn recorded_viewports(block: &BlockState) -> BTreeSet<Viewport> {
    block
        .saves
        .viewports()
        .chain(block.changes.viewports())
        .chain(block.removes.viewports())
        .collect()
}

/// Save and change buckets at `viewport`, ascending.
pub(crate) fn buckets_at(block: &BlockState, viewport: Viewport) -> BTreeSet<MaxWidth> {
    [&block.saves, &block.changes]
        .into_iter()
        .filter_map(|set| set.buckets(viewport))
        .flat_map(|buckets| buckets.keys().copied())
        .collect()
}

/// Every viewport at which the effective style may change.
///
/// That is each configured breakpoint, each recorded viewport, and the
/// first pixel past each bounded bucket.
pub fn valid_viewports(block: &BlockState, breakpoints: &Breakpoints) -> BTreeSet<Viewport> {
    let mut viewports: BTreeSet<Viewport> = breakpoints.viewports().collect();
    viewports.extend(recorded_viewports(block));
    for set in [&block.saves, &block.changes, &block.removes] {
        viewports.extend(
            set.bounded_buckets()
                .filter_map(|(_, upper)| upper.checked_add(1)),
        );
    }
    viewports
}

/// Builds the valids of `block`: the effective style at every valid viewport,
/// stored in each viewport's unbounded bucket.
///
/// Every breakpoint is kept, even with an empty effective style, so that
/// consumers can see where a property stops applying. Any other viewport is
/// kept only where the style differs from the one below it.
pub fn find_block_valids(block: &BlockState, breakpoints: &Breakpoints) -> ViewportStyleSet {
    let mut valids = ViewportStyleSet::new();
    let mut previous: Option<StyleTree> = None;
    for viewport in valid_viewports(block, breakpoints) {
        let style = effective_style(block, viewport);
        if !breakpoints.contains(viewport) && previous.as_ref() == Some(&style) {
            continue;
        }
        previous = Some(style.clone());
        valids.insert(viewport, MaxWidth::Unbounded, style);
    }
    valids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{breakpoints, style};
    use serde_json::json;

    fn block(saves: &[(Viewport, MaxWidth, serde_json::Value)]) -> BlockState {
        let mut block = BlockState::default();
        for (viewport, bucket, value) in saves {
            block.saves.insert(*viewport, *bucket, style(value.clone()));
        }
        block
    }

    #[test]
    fn test_inheritance_between_viewports() {
        let block = block(&[
            (0, MaxWidth::Unbounded, json!({ "width": "100%" })),
            (768, MaxWidth::Unbounded, json!({ "height": "auto" })),
        ]);
        assert_eq!(effective_style(&block, 375), style(json!({ "width": "100%" })));
        assert_eq!(
            effective_style(&block, 768),
            style(json!({ "width": "100%", "height": "auto" }))
        );
    }

    #[test]
    fn test_bounded_bucket_only_inside_its_range() {
        let block = block(&[
            (0, MaxWidth::Unbounded, json!({ "width": "100%" })),
            (375, MaxWidth::Bounded(767), json!({ "width": "50%" })),
        ]);
        assert_eq!(effective_style(&block, 500), style(json!({ "width": "50%" })));
        assert_eq!(effective_style(&block, 768), style(json!({ "width": "100%" })));
    }

    #[test]
    fn test_narrower_bucket_wins_at_same_viewport() {
        let block = block(&[
            (0, MaxWidth::Unbounded, json!({ "width": "100%" })),
            (0, MaxWidth::Bounded(1279), json!({ "width": "75%" })),
            (0, MaxWidth::Bounded(779), json!({ "width": "50%" })),
        ]);
        assert_eq!(effective_style(&block, 375), style(json!({ "width": "50%" })));
        assert_eq!(effective_style(&block, 780), style(json!({ "width": "75%" })));
        assert_eq!(effective_style(&block, 1280), style(json!({ "width": "100%" })));
    }

    #[test]
    fn test_pending_change_overrides_bounded_save() {
        let mut block = block(&[
            (0, MaxWidth::Unbounded, json!({ "width": "100%" })),
            (0, MaxWidth::Bounded(779), json!({ "width": "50%" })),
        ]);
        block
            .changes
            .insert(0, MaxWidth::Unbounded, style(json!({ "width": "30%" })));
        assert_eq!(effective_style(&block, 375), style(json!({ "width": "30%" })));
        assert_eq!(inherited_style(&block, 0), style(json!({ "width": "50%" })));
    }

    #[test]
    fn test_removes_subtract_within_range() {
        let mut block = block(&[(0, MaxWidth::Unbounded, json!({ "padding": { "top": "1px", "left": "2px" } }))]);
        block.removes.insert(
            768,
            MaxWidth::Unbounded,
            style(json!({ "padding": { "top": "1px" } })),
        );
        assert_eq!(
            effective_style(&block, 767),
            style(json!({ "padding": { "top": "1px", "left": "2px" } }))
        );
        assert_eq!(effective_style(&block, 768), style(json!({ "padding": { "left": "2px" } })));
        assert_eq!(
            inherited_style(&block, 768),
            style(json!({ "padding": { "top": "1px", "left": "2px" } }))
        );
    }

    #[test]
    fn test_valid_viewports_include_bucket_ends() {
        let block = block(&[
            (0, MaxWidth::Unbounded, json!({})),
            (0, MaxWidth::Bounded(779), json!({ "width": "1px" })),
        ]);
        let viewports: Vec<_> = valid_viewports(&block, &breakpoints()).into_iter().collect();
        assert_eq!(viewports, vec![0, 375, 768, 780, 1280]);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let block = block(&[
            (0, MaxWidth::Unbounded, json!({ "width": "100%" })),
            (768, MaxWidth::Unbounded, json!({ "width": "50%" })),
        ]);
        let bps = breakpoints();
        assert_eq!(find_block_valids(&block, &bps), find_block_valids(&block, &bps));
    }
}
