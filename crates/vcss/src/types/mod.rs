pub mod value;
pub mod viewport_set;

pub use value::{Scalar, StyleTree, StyleValue};
pub use viewport_set::{BucketSet, MaxWidth, Viewport, ViewportStyleSet};
