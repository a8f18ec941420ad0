//! Per-block viewport style state.
//!
//! Every registered block owns four [`ViewportStyleSet`]s:
//!
//! - `saves`: the persisted style
//! - `changes`: pending edits, plus the range caps derived from removes
//! - `removes`: saved properties explicitly unset at a viewport
//! - `valids`: the derived effective style at every valid viewport
//!
//! `valids` is never edited directly; [`BlockState::settle`] rebuilds it
//! after each mutation.

use std::collections::BTreeMap;

use serde_json::Value;
use vcss::object::{
    StylePath, find_equal_properties, leaf_paths, merge_objects, subtract_object,
    traverse_delete, traverse_get,
};
use vcss::types::value::tree_from_json;
use vcss::{MaxWidth, StyleTree, Viewport, ViewportStyleSet};

use crate::breakpoints::Breakpoints;
use crate::diff::{find_block_differences, prune_orphaned_removes, regenerate_caps};
use crate::error::{Result, StoreError};
use crate::valids::{effective_style, find_block_valids};

/// Stable identifier of a block.
pub type BlockId = String;

/// The style state of one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockState {
    pub saves: ViewportStyleSet,
    pub changes: ViewportStyleSet,
    pub removes: ViewportStyleSet,
    pub valids: ViewportStyleSet,
}

impl BlockState {
    /// Seeds a block from its attributes.
    ///
    /// `attributes.style` becomes the base save at viewport `0`. A missing or
    /// non-object style is read as `{}`. An optional `attributes.viewports`
    /// holds previously persisted saves; it is ignored when malformed.
    pub fn from_attributes(attributes: &Value) -> Self {
        let mut saves = match attributes.get("viewports") {
            None | Some(Value::Null) => ViewportStyleSet::new(),
            Some(persisted) => ViewportStyleSet::from_json(persisted).unwrap_or_else(|e| {
                log::warn!("Ignoring persisted viewport saves: {e}");
                ViewportStyleSet::new()
            }),
        };
        saves.insert(0, MaxWidth::Unbounded, style_root(attributes));
        saves.prune();

        Self {
            saves,
            ..Self::default()
        }
    }

    pub fn has_saves(&self) -> bool {
        has_properties(&self.saves)
    }

    pub fn has_changes(&self) -> bool {
        has_properties(&self.changes)
    }

    pub fn has_removes(&self) -> bool {
        has_properties(&self.removes)
    }

    pub fn has_valids(&self) -> bool {
        !self.valids.is_empty()
    }

    /// Replaces the pending edits at `viewport` with the delta for `incoming`.
    pub fn update_changes(&mut self, incoming: &StyleTree, viewport: Viewport, breakpoints: &Breakpoints) {
        let delta = find_block_differences(self, incoming, viewport);
        delta.apply(self);
        self.settle(breakpoints);
    }

    /// Unsets saved properties at `viewport`.
    ///
    /// With `paths`, only those properties are unset; otherwise every
    /// property effective at `viewport`. Pending changes to other properties
    /// are kept.
    pub fn remove_saves(&mut self, viewport: Viewport, paths: Option<&[StylePath]>, breakpoints: &Breakpoints) {
        let mut incoming = effective_style(self, viewport);
        match paths {
            Some(paths) => {
                for path in paths {
                    traverse_delete(&mut incoming, path);
                }
            }
            None => incoming.clear(),
        }
        self.update_changes(&incoming, viewport, breakpoints);
    }

    /// Drops removes recorded at `viewport`.
    ///
    /// With `paths`, only those properties are restored; otherwise all of them.
    pub fn restore_saves(&mut self, viewport: Viewport, paths: Option<&[StylePath]>, breakpoints: &Breakpoints) {
        match paths {
            Some(paths) => {
                let buckets: Vec<MaxWidth> = self
                    .removes
                    .buckets(viewport)
                    .map(|buckets| buckets.keys().copied().collect())
                    .unwrap_or_default();
                for bucket in buckets {
                    if let Some(removed) = self.removes.get_mut(viewport, bucket) {
                        for path in paths {
                            traverse_delete(removed, path);
                        }
                    }
                }
            }
            None => {
                self.removes.remove_viewport(viewport);
            }
        }
        self.settle(breakpoints);
    }

    /// Commits pending changes and removes into `saves`.
    ///
    /// The effective style is unchanged by a commit, except where a remove
    /// with a bounded range meets a save whose range extends past it. Such a
    /// save is left untouched and the remove is dropped.
    pub fn commit(&mut self, breakpoints: &Breakpoints) {
        let changes = std::mem::take(&mut self.changes);

        // An unbounded change overrides the bounded saves of its viewport.
        for (viewport, bucket, changed) in changes.iter() {
            if bucket.is_bounded() {
                continue;
            }
            for saved in self.bounded_saves_mut(viewport) {
                subtract_object(saved, changed);
            }
        }
        for (viewport, bucket, changed) in changes.iter() {
            merge_objects(self.saves.entry(viewport, bucket), changed);
        }

        // Widest ranges first, so a bounded remove never meets a save that an
        // unbounded remove of the same viewport already cleared.
        let removes = std::mem::take(&mut self.removes);
        let entries: Vec<(Viewport, MaxWidth, &StyleTree)> = removes.iter().collect();
        for (viewport, range, removed) in entries.into_iter().rev() {
            for (path, _) in leaf_paths(removed) {
                self.materialize_remove(&path, viewport, range);
            }
        }

        self.drop_redundant_bounded_saves();
        self.settle(breakpoints);
    }

    fn materialize_remove(&mut self, path: &[String], viewport: Viewport, range: MaxWidth) {
        let sources: Vec<(Viewport, MaxWidth)> = self
            .saves
            .covering(viewport)
            .filter(|(_, _, tree)| traverse_get(tree, path).is_some())
            .map(|(origin, bucket, _)| (origin, bucket))
            .collect();

        for (origin, bucket) in sources {
            if range == MaxWidth::Unbounded || bucket <= range {
                if let Some(tree) = self.saves.get_mut(origin, bucket) {
                    traverse_delete(tree, path);
                }
            } else {
                log::warn!(
                    "Cannot commit remove of {} at {}px ({:?}): save at {}px ({:?}) extends past it",
                    path.join("."),
                    viewport,
                    range,
                    origin,
                    bucket
                );
            }
        }
    }

    fn bounded_saves_mut(&mut self, viewport: Viewport) -> impl Iterator<Item = &mut StyleTree> + '_ {
        self.saves
            .buckets_mut(viewport)
            .into_iter()
            .flat_map(|buckets| buckets.iter_mut())
            .filter(|(bucket, _)| bucket.is_bounded())
            .map(|(_, tree)| tree)
    }

    /// Drops bounded-bucket properties equal to what the wider buckets of
    /// the same viewport already supply.
    fn drop_redundant_bounded_saves(&mut self) {
        let viewports: Vec<Viewport> = self.saves.viewports().collect();
        for viewport in viewports {
            let bounded: Vec<MaxWidth> = self
                .saves
                .buckets(viewport)
                .map(|buckets| buckets.keys().copied().filter(|b| b.is_bounded()).collect())
                .unwrap_or_default();
            for bucket in bounded {
                let mut wider = StyleTree::new();
                if let Some(buckets) = self.saves.buckets(viewport) {
                    for (_, tree) in buckets.iter().rev().take_while(|(b, _)| **b > bucket) {
                        merge_objects(&mut wider, tree);
                    }
                }
                if let Some(tree) = self.saves.get_mut(viewport, bucket) {
                    let equal = find_equal_properties(tree, &wider);
                    subtract_object(tree, &equal);
                }
            }
        }
    }

    /// Restores the derived parts of the state after a mutation.
    ///
    /// Prunes orphaned removes, rebuilds range caps and empty entries, and
    /// recomputes valids.
    pub fn settle(&mut self, breakpoints: &Breakpoints) {
        let pruned = prune_orphaned_removes(self);
        if pruned > 0 {
            log::debug!("Pruned {pruned} orphaned removes");
        }
        regenerate_caps(self);
        self.saves.prune();
        self.changes.prune();
        self.removes.prune();
        self.valids = find_block_valids(self, breakpoints);
    }
}

fn has_properties(set: &ViewportStyleSet) -> bool {
    set.iter().any(|(_, _, tree)| !tree.is_empty())
}

/// Reads `attributes.style`, treating anything but an object as `{}`.
pub fn style_root(attributes: &Value) -> StyleTree {
    match attributes.get("style") {
        Some(Value::Object(map)) => tree_from_json(map.clone()),
        Some(other) => {
            log::debug!("Ignoring non-object style attribute: {other}");
            StyleTree::new()
        }
        None => {
            log::debug!("Attributes carry no style root");
            StyleTree::new()
        }
    }
}

/// All registered blocks and the breakpoint configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    breakpoints: Breakpoints,
    blocks: BTreeMap<BlockId, BlockState>,
}

impl ViewportState {
    pub fn new(breakpoints: Breakpoints) -> Self {
        Self {
            breakpoints,
            blocks: BTreeMap::new(),
        }
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    pub fn block(&self, id: &str) -> Option<&BlockState> {
        self.blocks.get(id)
    }

    pub fn try_block(&self, id: &str) -> Result<&BlockState> {
        self.blocks
            .get(id)
            .ok_or_else(|| StoreError::UnknownBlock(id.to_string()))
    }

    pub(crate) fn block_mut(&mut self, id: &str) -> Result<&mut BlockState> {
        self.blocks
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownBlock(id.to_string()))
    }

    pub(crate) fn insert_block(&mut self, id: BlockId, block: BlockState) -> Option<BlockState> {
        self.blocks.insert(id, block)
    }

    pub(crate) fn remove_block(&mut self, id: &str) -> Option<BlockState> {
        self.blocks.remove(id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (&str, &BlockState)> + '_ {
        self.blocks.iter().map(|(id, block)| (id.as_str(), block))
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.blocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
