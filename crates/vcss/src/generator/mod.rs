//! CSS spectrum generation.
//!
//! A [`Generator`] turns a block's effective per-viewport styles into
//! [`Spectrum`]s: CSS rules annotated with the pixel range they apply to.
//!
//! For every top-level property the generator renders the property at each
//! viewport, in ascending order, and tracks one running rule per selector.
//! A rule stays open while consecutive viewports render it identically. When
//! the rendering changes, or the selector stops appearing, the running rule
//! is closed just below that viewport:
//!
//! ```text
//! viewport   0      375    768    1280
//! padding    10px   10px   20px   20px
//!            [0 ........ 767] [768 .......)
//! ```
//!
//! The closed range becomes a min-max spectrum; the rule still open after the
//! last viewport is min-only. Spectrums for the same property and selector
//! therefore never overlap.

pub mod compiler;
pub mod registry;
pub mod rules;

use std::collections::BTreeSet;
use std::fmt;

use once_cell::unsync::OnceCell;

pub use compiler::{DeclarationCompiler, StyleEngine, css_property_name, kebab_case};
pub use registry::{CssRenderer, DEFAULT_PRIORITY, RenderOptions, RendererRegistry};
pub use rules::{CssRule, Declaration, RuleBody, merge_by_selector, split_rules};

use crate::error::Result;
use crate::types::{StyleValue, Viewport, ViewportStyleSet};
use registry::RenderPass;

/// One CSS rule and the viewport range it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// The top-level style property that produced the rule.
    pub property: String,
    pub selector: String,
    /// First viewport (min-width) the rule applies to.
    pub from: Viewport,
    /// Last pixel width the rule applies to, or `None` for no upper bound.
    pub to: Option<Viewport>,
    pub priority: i32,
    pub rule: CssRule,
    /// The property's style value at `from`.
    pub properties: StyleValue,
}

impl Spectrum {
    pub fn is_min_only(&self) -> bool {
        self.to.is_none()
    }

    /// Whether the spectrum applies at pixel width `width`.
    pub fn covers(&self, width: Viewport) -> bool {
        width >= self.from && self.to.is_none_or(|to| width <= to)
    }

    /// The media condition, without its outer parentheses.
    ///
    /// `min-width:768px` or `min-width:0px) and (max-width:767px`.
    pub fn media_query(&self) -> String {
        match self.to {
            Some(to) => format!("min-width:{}px) and (max-width:{}px", self.from, to),
            None => format!("min-width:{}px", self.from),
        }
    }

    /// Whether the rule needs an `@media` wrapper.
    pub fn needs_media(&self) -> bool {
        self.from > 0 || self.to.is_some()
    }

    /// The rule text, optionally marking every declaration `!important`.
    pub fn css(&self, important: bool) -> String {
        self.rule.to_css(important)
    }

    /// The rule text wrapped in its media query when it has a range.
    pub fn to_stylesheet(&self, important: bool) -> String {
        let css = self.css(important);
        if self.needs_media() {
            format!("@media ({}){{{}}}", self.media_query(), css)
        } else {
            css
        }
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stylesheet(false))
    }
}

/// A renderer whose output was dropped for one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub property: String,
    pub priority: i32,
    pub message: String,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' (priority {}): {}",
            self.property, self.priority, self.message
        )
    }
}

/// The ordered spectrums of one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumSet {
    pub spectrums: Vec<Spectrum>,
    /// Renderers whose contribution was skipped.
    pub failures: Vec<RenderFailure>,
}

impl SpectrumSet {
    pub fn len(&self) -> usize {
        self.spectrums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectrums.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spectrum> {
        self.spectrums.iter()
    }

    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a Spectrum> + 'a {
        self.spectrums.iter().filter(move |s| s.property == property)
    }

    /// Spectrums in effect at pixel width `width`.
    pub fn at(&self, width: Viewport) -> impl Iterator<Item = &Spectrum> + '_ {
        self.spectrums.iter().filter(move |s| s.covers(width))
    }
}

impl<'a> IntoIterator for &'a SpectrumSet {
    type Item = &'a Spectrum;
    type IntoIter = std::slice::Iter<'a, Spectrum>;

    fn into_iter(self) -> Self::IntoIter {
        self.spectrums.iter()
    }
}

/// A rule still accumulating consecutive viewports.
struct RunningRule {
    /// Position among all rules opened while building the set.
    discovered: usize,
    from: Viewport,
    rule: CssRule,
    properties: StyleValue,
}

impl RunningRule {
    fn close(self, property: &str, priority: i32, to: Option<Viewport>) -> (usize, Spectrum) {
        let spectrum = Spectrum {
            property: property.to_string(),
            selector: self.rule.selector.clone(),
            from: self.from,
            to,
            priority,
            rule: self.rule,
            properties: self.properties,
        };
        (self.discovered, spectrum)
    }
}

/// Builds the spectrum set of one block.
///
/// The generator reads a snapshot of the block's valids and never changes
/// it. The spectrum set is computed on first use and reused afterwards.
///
/// Each property is rendered once per renderer priority. When a renderer
/// fails or returns malformed CSS at any viewport, everything that pass
/// produced for the property is dropped, including viewports that rendered
/// fine, and the failure is recorded in [`SpectrumSet::failures`].
pub struct Generator<'a> {
    valids: &'a ViewportStyleSet,
    selector: String,
    registry: &'a RendererRegistry,
    is_saving: bool,
    spectrum_set: OnceCell<SpectrumSet>,
}

impl<'a> Generator<'a> {
    pub fn new(valids: &'a ViewportStyleSet, selector: impl Into<String>, registry: &'a RendererRegistry) -> Self {
        Self {
            valids,
            selector: selector.into(),
            registry,
            is_saving: false,
            spectrum_set: OnceCell::new(),
        }
    }

    /// Passes `is_saving` to every renderer.
    pub fn saving(mut self, is_saving: bool) -> Self {
        self.is_saving = is_saving;
        self.spectrum_set = OnceCell::new();
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn spectrum_set(&self) -> &SpectrumSet {
        self.spectrum_set.get_or_init(|| self.build())
    }

    /// The stylesheet for a preview at `current_viewport`.
    ///
    /// Spectrums starting above the current viewport are left out. Every
    /// declaration is marked `!important`.
    pub fn generate_css(&self, current_viewport: Viewport) -> String {
        self.spectrum_set()
            .iter()
            .filter(|spectrum| spectrum.from <= current_viewport)
            .map(|spectrum| spectrum.to_stylesheet(true))
            .collect()
    }

    /// Top-level properties present at any viewport, sorted.
    fn properties(&self) -> BTreeSet<&'a str> {
        self.valids
            .iter()
            .flat_map(|(_, _, style)| style.keys().map(String::as_str))
            .collect()
    }

    fn build(&self) -> SpectrumSet {
        let viewports: Vec<Viewport> = self.valids.viewports().collect();
        let mut set = SpectrumSet::default();
        let mut discovered = Vec::new();
        let mut next_discovery = 0;

        for property in self.properties() {
            for (priority, pass) in self.registry.passes(property) {
                match self.render_property(property, priority, &pass, &viewports, &mut next_discovery) {
                    Ok(spectrums) => discovered.extend(spectrums),
                    Err(e) => {
                        log::warn!("Dropping CSS for '{property}' (priority {priority}): {e}");
                        set.failures.push(RenderFailure {
                            property: property.to_string(),
                            priority,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        discovered.sort_by_key(|(order, s)| (s.from, !s.is_min_only(), s.priority, *order));
        set.spectrums = discovered.into_iter().map(|(_, spectrum)| spectrum).collect();
        log::trace!(
            "Generated {} spectrums for {}",
            set.spectrums.len(),
            self.selector
        );
        set
    }

    fn render_property(
        &self,
        property: &str,
        priority: i32,
        pass: &RenderPass<'_>,
        viewports: &[Viewport],
        next_discovery: &mut usize,
    ) -> Result<Vec<(usize, Spectrum)>> {
        let mut running: Vec<RunningRule> = Vec::new();
        let mut spectrums = Vec::new();

        for &viewport in viewports {
            let value = self
                .valids
                .style(viewport)
                .and_then(|style| style.get(property));
            let rules = match value {
                Some(value) => {
                    let options = RenderOptions {
                        selector: &self.selector,
                        property,
                        viewport,
                    };
                    let css = pass.render(value, &options, self.is_saving)?;
                    merge_by_selector(split_rules(&css)?)
                        .into_iter()
                        .filter(|rule| !rule.is_empty())
                        .collect()
                }
                None => Vec::new(),
            };

            let mut still_running = Vec::with_capacity(rules.len());
            for open in running {
                if rules.contains(&open.rule) {
                    still_running.push(open);
                } else {
                    let to = viewport.saturating_sub(1);
                    spectrums.push(open.close(property, priority, Some(to)));
                }
            }
            for rule in rules {
                if still_running.iter().all(|open| open.rule.selector != rule.selector) {
                    still_running.push(RunningRule {
                        discovered: *next_discovery,
                        from: viewport,
                        rule,
                        properties: value.cloned().unwrap_or_else(StyleValue::empty),
                    });
                    *next_discovery += 1;
                }
            }
            running = still_running;
        }

        spectrums.extend(
            running
                .into_iter()
                .map(|open| open.close(property, priority, None)),
        );
        Ok(spectrums)
    }
}

impl fmt::Debug for Generator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("selector", &self.selector)
            .field("is_saving", &self.is_saving)
            .field("viewports", &self.valids.viewports().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
