//! Per-viewport style sets.
//!
//! A [`ViewportStyleSet`] maps a viewport (a min-width breakpoint in pixels)
//! to one or more max-width buckets, each holding a style tree:
//!
//! ```text
//! viewport(px) -> max-width bucket -> style tree
//! ```
//!
//! A bucket is the inclusive upper pixel bound of the entry's effect. The
//! persisted key `0` means "no explicit upper bound" and is represented by
//! [`MaxWidth::Unbounded`], which orders after every bounded bucket.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, VcssError};
use crate::object::prune_empty;
use crate::types::value::{StyleTree, tree_from_json, tree_to_json};

/// A min-width breakpoint in pixels. `0` is the base viewport.
pub type Viewport = u32;

/// Upper bound of a bucket within a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaxWidth {
    /// Applies up to and including this pixel width.
    Bounded(Viewport),
    /// Applies from the viewport upward.
    Unbounded,
}

impl MaxWidth {
    /// Reads a persisted bucket key, where `0` means unbounded.
    pub fn from_key(key: u32) -> Self {
        if key == 0 {
            MaxWidth::Unbounded
        } else {
            MaxWidth::Bounded(key)
        }
    }

    /// The persisted bucket key.
    pub fn key(self) -> u32 {
        match self {
            MaxWidth::Bounded(px) => px,
            MaxWidth::Unbounded => 0,
        }
    }

    /// The bucket that caps a range just below `viewport`.
    ///
    /// `None` when there is no representable cap: a cap of `0` would read
    /// back as unbounded.
    pub fn below(viewport: Viewport) -> Option<Self> {
        match viewport.checked_sub(1) {
            Some(px) if px > 0 => Some(MaxWidth::Bounded(px)),
            _ => None,
        }
    }

    /// Whether a bucket reaches `width`. The lower bound is the owning viewport.
    pub fn covers(self, width: Viewport) -> bool {
        match self {
            MaxWidth::Bounded(px) => width <= px,
            MaxWidth::Unbounded => true,
        }
    }

    pub fn is_bounded(self) -> bool {
        matches!(self, MaxWidth::Bounded(_))
    }
}

/// The buckets recorded for one viewport.
pub type BucketSet = BTreeMap<MaxWidth, StyleTree>;

/// Style trees keyed by viewport and max-width bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportStyleSet {
    viewports: BTreeMap<Viewport, BucketSet>,
}

impl ViewportStyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding `tree` as the unbounded entry of viewport `0`.
    pub fn base(tree: StyleTree) -> Self {
        let mut set = Self::new();
        set.insert(0, MaxWidth::Unbounded, tree);
        set
    }

    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    pub fn get(&self, viewport: Viewport, bucket: MaxWidth) -> Option<&StyleTree> {
        self.viewports.get(&viewport).and_then(|b| b.get(&bucket))
    }

    pub fn get_mut(&mut self, viewport: Viewport, bucket: MaxWidth) -> Option<&mut StyleTree> {
        self.viewports
            .get_mut(&viewport)
            .and_then(|b| b.get_mut(&bucket))
    }

    /// The unbounded entry of a viewport.
    pub fn style(&self, viewport: Viewport) -> Option<&StyleTree> {
        self.get(viewport, MaxWidth::Unbounded)
    }

    /// Returns the tree at `(viewport, bucket)`, creating an empty one.
    pub fn entry(&mut self, viewport: Viewport, bucket: MaxWidth) -> &mut StyleTree {
        self.viewports
            .entry(viewport)
            .or_default()
            .entry(bucket)
            .or_default()
    }

    pub fn insert(
        &mut self,
        viewport: Viewport,
        bucket: MaxWidth,
        tree: StyleTree,
    ) -> Option<StyleTree> {
        self.viewports
            .entry(viewport)
            .or_default()
            .insert(bucket, tree)
    }

    pub fn remove(&mut self, viewport: Viewport, bucket: MaxWidth) -> Option<StyleTree> {
        let buckets = self.viewports.get_mut(&viewport)?;
        let removed = buckets.remove(&bucket);
        if buckets.is_empty() {
            self.viewports.remove(&viewport);
        }
        removed
    }

    pub fn remove_viewport(&mut self, viewport: Viewport) -> Option<BucketSet> {
        self.viewports.remove(&viewport)
    }

    pub fn buckets(&self, viewport: Viewport) -> Option<&BucketSet> {
        self.viewports.get(&viewport)
    }

    pub fn buckets_mut(&mut self, viewport: Viewport) -> Option<&mut BucketSet> {
        self.viewports.get_mut(&viewport)
    }

    /// Viewports with at least one bucket, ascending.
    pub fn viewports(&self) -> impl Iterator<Item = Viewport> + '_ {
        self.viewports.keys().copied()
    }

    /// Every bounded bucket, as `(viewport, upper bound)`.
    pub fn bounded_buckets(&self) -> impl Iterator<Item = (Viewport, Viewport)> + '_ {
        self.iter().filter_map(|(viewport, bucket, _)| match bucket {
            MaxWidth::Bounded(px) => Some((viewport, px)),
            MaxWidth::Unbounded => None,
        })
    }

    /// All entries, viewports ascending and buckets in ascending upper-bound order.
    pub fn iter(&self) -> impl Iterator<Item = (Viewport, MaxWidth, &StyleTree)> + '_ {
        self.viewports.iter().flat_map(|(viewport, buckets)| {
            buckets
                .iter()
                .map(move |(bucket, tree)| (*viewport, *bucket, tree))
        })
    }

    /// Entries whose range contains `width`, viewports ascending and buckets
    /// in ascending upper-bound order.
    pub fn covering(&self, width: Viewport) -> impl Iterator<Item = (Viewport, MaxWidth, &StyleTree)> + '_ {
        self.viewports
            .range(..=width)
            .flat_map(move |(viewport, buckets)| {
                buckets
                    .iter()
                    .filter(move |(bucket, _)| bucket.covers(width))
                    .map(move |(bucket, tree)| (*viewport, *bucket, tree))
            })
    }

    /// Drops empty groups and entries.
    ///
    /// An empty unbounded entry survives while its viewport still has
    /// bounded buckets, so that every recorded viewport keeps a bucket `0`.
    pub fn prune(&mut self) {
        for buckets in self.viewports.values_mut() {
            for tree in buckets.values_mut() {
                prune_empty(tree);
            }
            buckets.retain(|bucket, tree| !bucket.is_bounded() || !tree.is_empty());
            let has_bounded = buckets.keys().any(|bucket| bucket.is_bounded());
            let unbounded_empty = buckets.get(&MaxWidth::Unbounded).map(StyleTree::is_empty);
            match unbounded_empty {
                Some(true) if !has_bounded => {
                    buckets.remove(&MaxWidth::Unbounded);
                }
                None if has_bounded => {
                    buckets.insert(MaxWidth::Unbounded, StyleTree::new());
                }
                _ => {}
            }
        }
        self.viewports.retain(|_, buckets| !buckets.is_empty());
    }

    /// Converts to the persisted `{ "<px>": { "<bucket>": { "style": {...} } } }` shape.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for (viewport, buckets) in &self.viewports {
            let mut entries = Map::new();
            for (bucket, tree) in buckets {
                let mut entry = Map::new();
                entry.insert("style".to_string(), tree_to_json(tree));
                entries.insert(bucket.key().to_string(), Value::Object(entry));
            }
            root.insert(viewport.to_string(), Value::Object(entries));
        }
        Value::Object(root)
    }

    /// Reads the persisted shape produced by [`ViewportStyleSet::to_json`].
    ///
    /// An entry without a `style` member is read as an empty style.
    pub fn from_json(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| VcssError::InvalidViewportSet("expected an object".into()))?;

        let mut set = Self::new();
        for (viewport_key, buckets) in root {
            let viewport = parse_key(viewport_key)?;
            let buckets = buckets.as_object().ok_or_else(|| {
                VcssError::InvalidViewportSet(format!("viewport {viewport_key} is not an object"))
            })?;
            for (bucket_key, entry) in buckets {
                let bucket = MaxWidth::from_key(parse_key(bucket_key)?);
                let style = match entry.get("style") {
                    Some(Value::Object(map)) => tree_from_json(map.clone()),
                    Some(Value::Null) | None => StyleTree::new(),
                    Some(other) => {
                        return Err(VcssError::InvalidViewportSet(format!(
                            "style at {viewport_key}/{bucket_key} is not an object: {other}"
                        )));
                    }
                };
                set.insert(viewport, bucket, style);
            }
        }
        Ok(set)
    }
}

fn parse_key(key: &str) -> Result<u32> {
    key.trim()
        .parse::<u32>()
        .map_err(|_| VcssError::InvalidViewportSet(format!("'{key}' is not a pixel width")))
}

impl Serialize for ViewportStyleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::StyleValue;
    use serde_json::json;

    fn tree(value: Value) -> StyleTree {
        StyleValue::from_json(value)
            .and_then(|v| v.as_node().cloned())
            .unwrap_or_default()
    }

    #[test]
    fn test_unbounded_orders_after_bounded() {
        assert!(MaxWidth::Bounded(779) < MaxWidth::Unbounded);
        assert!(MaxWidth::Bounded(374) < MaxWidth::Bounded(779));
    }

    #[test]
    fn test_cap_below_viewport() {
        assert_eq!(MaxWidth::below(780), Some(MaxWidth::Bounded(779)));
        assert_eq!(MaxWidth::below(1), None);
        assert_eq!(MaxWidth::below(0), None);
    }

    #[test]
    fn test_covering_respects_bucket_bounds() {
        let mut set = ViewportStyleSet::new();
        set.insert(0, MaxWidth::Bounded(779), tree(json!({ "a": 1 })));
        set.insert(0, MaxWidth::Unbounded, tree(json!({ "b": 1 })));
        set.insert(768, MaxWidth::Unbounded, tree(json!({ "c": 1 })));

        let at_780: Vec<_> = set.covering(780).map(|(v, b, _)| (v, b)).collect();
        assert_eq!(
            at_780,
            vec![(0, MaxWidth::Unbounded), (768, MaxWidth::Unbounded)]
        );

        let at_500: Vec<_> = set.covering(500).map(|(v, b, _)| (v, b)).collect();
        assert_eq!(
            at_500,
            vec![(0, MaxWidth::Bounded(779)), (0, MaxWidth::Unbounded)]
        );
    }

    #[test]
    fn test_json_shape() {
        let mut set = ViewportStyleSet::new();
        set.insert(0, MaxWidth::Unbounded, tree(json!({ "width": "100%" })));
        set.insert(0, MaxWidth::Bounded(767), tree(json!({ "height": "auto" })));

        let value = set.to_json();
        assert_eq!(
            value,
            json!({
                "0": {
                    "0": { "style": { "width": "100%" } },
                    "767": { "style": { "height": "auto" } }
                }
            })
        );
        assert_eq!(ViewportStyleSet::from_json(&value).unwrap(), set);
    }

    #[test]
    fn test_from_json_rejects_non_numeric_viewports() {
        let result = ViewportStyleSet::from_json(&json!({ "tablet": {} }));
        assert!(matches!(result, Err(VcssError::InvalidViewportSet(_))));
    }

    #[test]
    fn test_prune_keeps_unbounded_next_to_bounded() {
        let mut set = ViewportStyleSet::new();
        set.insert(0, MaxWidth::Unbounded, StyleTree::new());
        set.insert(0, MaxWidth::Bounded(779), tree(json!({ "a": 1 })));
        set.insert(375, MaxWidth::Unbounded, tree(json!({ "b": {} })));
        set.prune();

        assert!(set.get(0, MaxWidth::Unbounded).is_some());
        assert!(set.buckets(375).is_none());
    }
}
