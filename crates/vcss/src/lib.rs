//! # VCSS - Viewport CSS
//!
//! Style trees, per-viewport style sets and breakpoint-aware CSS generation
//! for content blocks.
//!
//! A block's visual style is an arbitrarily nested tree of properties
//! (`spacing.padding.top`, `dimensions.width`, custom extension keys). This
//! crate provides:
//!
//! - **Types**: [`StyleValue`] trees and [`ViewportStyleSet`]s keyed by
//!   viewport and max-width bucket
//! - **Object utilities**: deep get/set/delete, merge, subtract and diff
//! - **Generation**: turn effective per-viewport styles into ordered CSS
//!   [`Spectrum`](generator::Spectrum)s with computed media ranges
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use vcss::generator::{Generator, RendererRegistry};
//! use vcss::types::{MaxWidth, StyleValue, ViewportStyleSet};
//!
//! let style = |v: serde_json::Value| StyleValue::from_json(v).and_then(|s| s.as_node().cloned()).unwrap_or_default();
//!
//! let mut valids = ViewportStyleSet::new();
//! valids.insert(0, MaxWidth::Unbounded, style(json!({ "width": "100%" })));
//! valids.insert(768, MaxWidth::Unbounded, style(json!({ "width": "50%" })));
//!
//! let registry = RendererRegistry::new();
//! let generator = Generator::new(&valids, "#block-b1", &registry);
//! assert_eq!(
//!     generator.generate_css(768),
//!     "@media (min-width:0px) and (max-width:767px){#block-b1{width:100% !important}}\
//!      @media (min-width:768px){#block-b1{width:50% !important}}"
//! );
//! ```
//!
//! ## Renderers
//!
//! Properties are rendered by closures registered on a
//! [`RendererRegistry`](generator::RendererRegistry). A property may have
//! several renderers; each runs in ascending priority order and may emit
//! rules for several selectors. Properties without a renderer are compiled
//! by the registry's fallback [`StyleEngine`](generator::StyleEngine).
//!
//! ## Modules
//!
//! - [`types`]: style values and viewport style sets
//! - [`object`]: path and object utilities over style trees
//! - [`generator`]: renderers, rule splitting and spectrum generation
//! - [`error`]: error types

pub mod error;
pub mod generator;
pub mod object;
pub mod types;

pub use error::{Result, VcssError};
pub use generator::{Generator, Spectrum, SpectrumSet};
pub use types::{MaxWidth, Scalar, StyleTree, StyleValue, Viewport, ViewportStyleSet};
