//! The viewport style store.
//!
//! [`Store`] owns the [`ViewportState`] of every block together with the
//! renderers used to turn valids into CSS. All mutation goes through
//! [`Store::dispatch`]; subscribers are notified after each dispatch that
//! changed something.
//!
//! ```
//! use serde_json::json;
//! use viewport::testing::store;
//! use viewport::Action;
//!
//! let mut store = store();
//! store
//!     .dispatch(Action::RegisterBlockInit {
//!         id: "b1".into(),
//!         attributes: json!({ "style": { "width": "100%" } }),
//!     })
//!     .unwrap();
//!
//! assert_eq!(store.get_css("b1").unwrap(), "#block-b1{width:100% !important}");
//! ```

use std::fmt;

use serde_json::Value;
use vcss::generator::{Generator, RendererRegistry, SpectrumSet};
use vcss::{Viewport, ViewportStyleSet};

use crate::action::{Action, StateChanges};
use crate::breakpoints::Breakpoints;
use crate::error::Result;
use crate::state::{BlockState, ViewportState};

/// Selector template used when none is configured.
pub const DEFAULT_SELECTOR_TEMPLATE: &str = "#block-{id}";

/// Callback invoked with the settled state after a dispatch.
pub type Subscriber = Box<dyn FnMut(&ViewportState, StateChanges)>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Store {
    state: ViewportState,
    registry: RendererRegistry,
    selector_template: String,
    viewport: Viewport,
    pub(crate) saving: bool,
    pub(crate) autosaving: bool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Store {
    pub fn new(breakpoints: Breakpoints, registry: RendererRegistry) -> Self {
        Self {
            state: ViewportState::new(breakpoints),
            registry,
            selector_template: DEFAULT_SELECTOR_TEMPLATE.to_string(),
            viewport: 0,
            saving: false,
            autosaving: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Builds a store from a `{ "<px>": "<label>" }` breakpoint map.
    pub fn from_breakpoints_json(breakpoints: &Value, registry: RendererRegistry) -> Result<Self> {
        Ok(Self::new(Breakpoints::from_json(breakpoints)?, registry))
    }

    /// Sets the block selector template. `{id}` is replaced by the block id.
    pub fn with_selector_template(mut self, template: impl Into<String>) -> Self {
        self.selector_template = template.into();
        self
    }

    /// Sets the preview viewport used by [`Store::get_css`].
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        self.state.breakpoints()
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RendererRegistry {
        &mut self.registry
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_autosaving(&self) -> bool {
        self.autosaving
    }

    /// Applies `action` and notifies subscribers when anything changed.
    pub fn dispatch(&mut self, action: Action) -> Result<StateChanges> {
        let changes = self.state.apply(action)?;
        if !changes.is_empty() {
            for (_, subscriber) in &mut self.subscribers {
                subscriber(&self.state, changes);
            }
        }
        Ok(changes)
    }

    /// Registers a block, rejecting malformed persisted saves.
    ///
    /// Unlike [`Action::RegisterBlockInit`], which ignores a malformed
    /// `viewports` attribute, this fails with
    /// [`StoreError::Css`](crate::StoreError::Css).
    pub fn register_persisted_block(&mut self, id: impl Into<String>, attributes: Value) -> Result<StateChanges> {
        if let Some(persisted) = attributes.get("viewports").filter(|v| !v.is_null()) {
            ViewportStyleSet::from_json(persisted)?;
        }
        self.dispatch(Action::RegisterBlockInit {
            id: id.into(),
            attributes,
        })
    }

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&ViewportState, StateChanges) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscription, _)| *subscription != id);
        self.subscribers.len() != before
    }

    /// The CSS selector of a block.
    pub fn selector(&self, id: &str) -> String {
        self.selector_template.replace("{id}", id)
    }

    pub fn block(&self, id: &str) -> Result<&BlockState> {
        self.state.try_block(id)
    }

    pub fn get_block_valids(&self, id: &str) -> Result<&ViewportStyleSet> {
        Ok(&self.block(id)?.valids)
    }

    /// A generator over the block's current valids.
    pub fn generator(&self, id: &str) -> Result<Generator<'_>> {
        let valids = self.get_block_valids(id)?;
        Ok(Generator::new(valids, self.selector(id), &self.registry).saving(self.saving))
    }

    pub fn get_spectrum_set(&self, id: &str) -> Result<SpectrumSet> {
        Ok(self.generator(id)?.spectrum_set().clone())
    }

    /// The block's stylesheet for the current preview viewport.
    pub fn get_css(&self, id: &str) -> Result<String> {
        Ok(self.generator(id)?.generate_css(self.viewport))
    }

    /// The block's saves as plain nested JSON.
    pub fn persisted_saves(&self, id: &str) -> Result<Value> {
        Ok(self.block(id)?.saves.to_json())
    }

    pub fn has_block_changes(&self, id: &str) -> bool {
        self.state.block(id).is_some_and(BlockState::has_changes)
    }

    pub fn has_block_removes(&self, id: &str) -> bool {
        self.state.block(id).is_some_and(BlockState::has_removes)
    }

    pub fn has_block_saves(&self, id: &str) -> bool {
        self.state.block(id).is_some_and(BlockState::has_saves)
    }

    pub fn has_block_valids(&self, id: &str) -> bool {
        self.state.block(id).is_some_and(BlockState::has_valids)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("selector_template", &self.selector_template)
            .field("viewport", &self.viewport)
            .field("saving", &self.saving)
            .field("autosaving", &self.autosaving)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
