//! # Viewport
//!
//! A per-block, per-breakpoint style store for content blocks.
//!
//! Authors edit a block's style while previewing one viewport at a time. The
//! store decides, for each edit, what is a pending change, what is a removal
//! of an inherited value, and which ranges of lower breakpoints must be
//! capped to keep their styles intact. From that state it derives the
//! effective style at every breakpoint ("valids") and the block's
//! breakpoint-aware stylesheet.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use viewport::{Action, Breakpoints, Store};
//! use vcss::generator::RendererRegistry;
//!
//! let breakpoints = Breakpoints::new([(0, "Base"), (768, "Tablet")]).unwrap();
//! let mut store = Store::new(breakpoints, RendererRegistry::new()).with_viewport(768);
//!
//! store.dispatch(Action::RegisterBlockInit {
//!     id: "b1".into(),
//!     attributes: json!({ "style": { "width": "100%" } }),
//! }).unwrap();
//! store.dispatch(Action::UpdateBlockChanges {
//!     id: "b1".into(),
//!     attributes: json!({ "style": { "width": "50%" } }),
//!     viewport: 768,
//! }).unwrap();
//!
//! assert!(store.has_block_changes("b1"));
//! assert_eq!(
//!     store.get_css("b1").unwrap(),
//!     "@media (min-width:0px) and (max-width:767px){#block-b1{width:100% !important}}\
//!      @media (min-width:768px){#block-b1{width:50% !important}}"
//! );
//! ```
//!
//! ## Modules
//!
//! - [`breakpoints`]: breakpoint configuration
//! - [`state`]: saves, changes, removes and valids per block
//! - [`diff`]: incoming snapshot diffing and range caps
//! - [`valids`]: projection of the state into effective styles
//! - [`action`]: actions and state transitions
//! - [`store`]: the store, its queries and subscriptions
//! - [`lifecycle`]: host save events

pub mod action;
pub mod breakpoints;
pub mod diff;
pub mod error;
pub mod lifecycle;
pub mod state;
pub mod store;
pub mod testing;
pub mod valids;

mod log_init;

pub use action::{Action, StateChanges, reduce};
pub use breakpoints::Breakpoints;
pub use diff::{BlockDelta, find_block_differences, find_viewport_set_occurrence};
pub use error::{ConfigError, Result, StoreError};
pub use lifecycle::SaveLifecycleObserver;
pub use log_init::{init_logger, init_logger_with_level};
pub use state::{BlockId, BlockState, ViewportState};
pub use store::{Store, SubscriptionId};
pub use valids::{effective_style, find_block_valids};
