//! Test utilities for viewport style state.
//!
//! Style trees are easiest to write as JSON:
//!
//! ```
//! use serde_json::json;
//! use viewport::testing::{breakpoints, style};
//!
//! let tree = style(json!({ "spacing": { "padding": { "top": "10px" } } }));
//! assert_eq!(tree.len(), 1);
//! assert_eq!(breakpoints().viewports().collect::<Vec<_>>(), vec![0, 375, 768, 1280]);
//! ```

use serde_json::{Value, json};
use vcss::generator::RendererRegistry;
use vcss::{StyleTree, StyleValue, Viewport};

use crate::breakpoints::Breakpoints;
use crate::store::Store;

/// Base, mobile, tablet and desktop breakpoints: `0, 375, 768, 1280`.
pub fn breakpoints() -> Breakpoints {
    Breakpoints::new([(0, "Base"), (375, "Mobile"), (768, "Tablet"), (1280, "Desktop")])
        .expect("standard breakpoints include 0")
}

/// Converts a JSON object into a style tree. Anything else is `{}`.
pub fn style(value: Value) -> StyleTree {
    StyleValue::from_json(value)
        .and_then(|v| v.as_node().cloned())
        .unwrap_or_default()
}

/// Wraps a style tree in block attributes: `{ "style": ... }`.
pub fn attributes(style: Value) -> Value {
    json!({ "style": style })
}

/// A store over [`breakpoints`] with the default renderers.
pub fn store() -> Store {
    Store::new(breakpoints(), RendererRegistry::new())
}

/// The valid style of `id` in effect at `viewport`, or `{}`.
///
/// Reads the nearest valid viewport at or below `viewport`.
pub fn valid_style(store: &Store, id: &str, viewport: Viewport) -> StyleTree {
    let Ok(valids) = store.get_block_valids(id) else {
        return StyleTree::new();
    };
    valids
        .viewports()
        .take_while(|v| *v <= viewport)
        .last()
        .and_then(|v| valids.style(v).cloned())
        .unwrap_or_default()
}
