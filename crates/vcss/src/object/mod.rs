//! Generic style-tree utilities.
//!
//! - [`path`]: `traverse_get`, `traverse_set`, `traverse_delete`, `leaf_paths`
//! - [`merge`]: `merge_objects`, `subtract_object`, `prune_empty`
//! - [`diff`]: `find_object_changes`, `find_removed_properties`, `find_equal_properties`

pub mod diff;
pub mod merge;
pub mod path;

pub use diff::{find_equal_properties, find_object_changes, find_removed_properties};
pub use merge::{merge_objects, prune_empty, subtract_object};
pub use path::{StylePath, leaf_paths, path, traverse_delete, traverse_get, traverse_set};
