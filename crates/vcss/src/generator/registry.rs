//! Per-property CSS renderers.
//!
//! Extensions register renderers for the style properties they own. A
//! property may have any number of renderers; they run in ascending priority
//! order (registration order breaks ties) and each contributes its own CSS.
//! Properties with no renderer go through the registry's fallback
//! [`StyleEngine`].

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::generator::compiler::{DeclarationCompiler, StyleEngine};
use crate::types::{StyleValue, Viewport};

/// Priority given to the fallback compiler's rules.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Context handed to a renderer for one property at one viewport.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    /// The block's selector, e.g. `#block-b1`.
    pub selector: &'a str,
    /// The top-level style property being rendered.
    pub property: &'a str,
    /// The viewport whose effective value is being rendered.
    pub viewport: Viewport,
}

/// Renders one style property to CSS text.
///
/// The output is zero or more `selector { declarations }` blocks. An empty
/// string means the property produces no CSS at this viewport.
pub trait CssRenderer {
    fn render(&self, value: &StyleValue, options: &RenderOptions<'_>, is_saving: bool) -> Result<String>;
}

impl<F> CssRenderer for F
where
    F: Fn(&StyleValue, &RenderOptions<'_>, bool) -> Result<String>,
{
    fn render(&self, value: &StyleValue, options: &RenderOptions<'_>, is_saving: bool) -> Result<String> {
        self(value, options, is_saving)
    }
}

struct RegisteredRenderer {
    priority: i32,
    renderer: Box<dyn CssRenderer>,
}

/// One way of producing CSS for a property.
pub(crate) enum RenderPass<'a> {
    Custom(&'a dyn CssRenderer),
    Fallback(&'a dyn StyleEngine),
}

impl RenderPass<'_> {
    pub(crate) fn render(
        &self,
        value: &StyleValue,
        options: &RenderOptions<'_>,
        is_saving: bool,
    ) -> Result<String> {
        match self {
            RenderPass::Custom(renderer) => renderer.render(value, options, is_saving),
            RenderPass::Fallback(engine) => engine.compile(options.property, value, options.selector),
        }
    }
}

/// The renderers known to a generator.
pub struct RendererRegistry {
    renderers: HashMap<String, Vec<RegisteredRenderer>>,
    fallback: Box<dyn StyleEngine>,
}

impl RendererRegistry {
    /// A registry that compiles unregistered properties with [`DeclarationCompiler`].
    pub fn new() -> Self {
        Self::with_fallback(DeclarationCompiler)
    }

    pub fn with_fallback(engine: impl StyleEngine + 'static) -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Box::new(engine),
        }
    }

    /// Registers `renderer` for `property`.
    pub fn register(
        &mut self,
        property: impl Into<String>,
        priority: i32,
        renderer: impl CssRenderer + 'static,
    ) -> &mut Self {
        let entries = self.renderers.entry(property.into()).or_default();
        // Insert after every entry with priority <= ours to keep registration order on ties.
        let index = entries.partition_point(|entry| entry.priority <= priority);
        entries.insert(
            index,
            RegisteredRenderer {
                priority,
                renderer: Box::new(renderer),
            },
        );
        self
    }

    /// Registers a closure renderer.
    pub fn register_fn<F>(&mut self, property: impl Into<String>, priority: i32, render: F) -> &mut Self
    where
        F: Fn(&StyleValue, &RenderOptions<'_>, bool) -> Result<String> + 'static,
    {
        self.register(property, priority, render)
    }

    pub fn has_renderer(&self, property: &str) -> bool {
        self.renderers
            .get(property)
            .is_some_and(|entries| !entries.is_empty())
    }

    /// Priorities registered for `property`, ascending.
    pub fn priorities(&self, property: &str) -> Vec<i32> {
        self.renderers
            .get(property)
            .map(|entries| entries.iter().map(|e| e.priority).collect())
            .unwrap_or_default()
    }

    pub fn fallback(&self) -> &dyn StyleEngine {
        self.fallback.as_ref()
    }

    /// The passes that render `property`, in ascending priority.
    pub(crate) fn passes(&self, property: &str) -> Vec<(i32, RenderPass<'_>)> {
        match self.renderers.get(property) {
            Some(entries) if !entries.is_empty() => entries
                .iter()
                .map(|entry| (entry.priority, RenderPass::Custom(entry.renderer.as_ref())))
                .collect(),
            _ => vec![(DEFAULT_PRIORITY, RenderPass::Fallback(self.fallback.as_ref()))],
        }
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut properties: Vec<_> = self
            .renderers
            .iter()
            .map(|(property, entries)| (property.as_str(), entries.len()))
            .collect();
        properties.sort();
        f.debug_struct("RendererRegistry")
            .field("renderers", &properties)
            .finish_non_exhaustive()
    }
}
