//! Fallback compilation of style subtrees into CSS.
//!
//! Properties without a registered renderer are compiled by a [`StyleEngine`].
//! The default [`DeclarationCompiler`] flattens the subtree into one
//! declaration per leaf:
//!
//! ```text
//! spacing: { padding: { top: "10px" } }   ->  padding-top:10px
//! color:   { background: "#fff" }         ->  background-color:#fff
//! customShadow: "none"                    ->  custom-shadow:none
//! ```

use phf::{phf_map, phf_set};

use crate::error::Result;
use crate::generator::rules::{CssRule, Declaration};
use crate::object::{StylePath, leaf_paths};
use crate::types::{Scalar, StyleTree, StyleValue};

/// Generic property-to-CSS compiler used when no custom renderer is registered.
pub trait StyleEngine {
    /// Compiles `property: value` into CSS rules for `selector`.
    ///
    /// Returns an empty string when the value produces no declarations.
    fn compile(&self, property: &str, value: &StyleValue, selector: &str) -> Result<String>;
}

/// Style groups whose paths map to a CSS property prefix.
static GROUP_PROPERTIES: phf::Map<&'static str, &'static str> = phf_map! {
    "spacing.padding" => "padding",
    "spacing.margin" => "margin",
    "spacing.blockGap" => "gap",
    "color.text" => "color",
    "color.background" => "background-color",
    "color.gradient" => "background",
    "typography.fontSize" => "font-size",
    "typography.fontFamily" => "font-family",
    "typography.fontWeight" => "font-weight",
    "typography.fontStyle" => "font-style",
    "typography.lineHeight" => "line-height",
    "typography.letterSpacing" => "letter-spacing",
    "typography.textTransform" => "text-transform",
    "typography.textDecoration" => "text-decoration",
    "border.radius" => "border-radius",
    "border.width" => "border-width",
    "border.color" => "border-color",
    "border.style" => "border-style",
    "dimensions.minHeight" => "min-height",
    "dimensions.aspectRatio" => "aspect-ratio",
};

/// Group names dropped from the front of a path when no table entry matches.
static TRANSPARENT_GROUPS: phf::Set<&'static str> = phf_set! {
    "dimensions",
    "layout",
    "spacing",
    "typography",
    "color",
    "position",
};

/// Compiles each leaf of a property subtree into a declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationCompiler;

impl DeclarationCompiler {
    pub fn new() -> Self {
        Self
    }

    /// The declarations for `property: value`, in path order.
    pub fn declarations(&self, property: &str, value: &StyleValue) -> Vec<Declaration> {
        let mut wrapper = StyleTree::new();
        wrapper.insert(property.to_string(), value.clone());

        leaf_paths(&wrapper)
            .into_iter()
            .filter_map(|(path, leaf)| {
                let css_value = css_value(leaf)?;
                Some(Declaration::new(css_property_name(&path), css_value))
            })
            .collect()
    }
}

impl StyleEngine for DeclarationCompiler {
    fn compile(&self, property: &str, value: &StyleValue, selector: &str) -> Result<String> {
        let declarations = self.declarations(property, value);
        if declarations.is_empty() {
            return Ok(String::new());
        }
        Ok(CssRule::new(selector, declarations).to_css(false))
    }
}

/// Resolves a leaf path to a CSS property name.
pub fn css_property_name(path: &StylePath) -> String {
    // Longest table match first: "spacing.padding.top" -> "padding" + "-top".
    for split in (1..=path.len()).rev() {
        let key = path[..split].join(".");
        if let Some(prefix) = GROUP_PROPERTIES.get(key.as_str()) {
            let mut name = prefix.to_string();
            for segment in &path[split..] {
                name.push('-');
                name.push_str(&kebab_case(segment));
            }
            return name;
        }
    }

    let segments = match path.split_first() {
        Some((first, rest)) if !rest.is_empty() && TRANSPARENT_GROUPS.contains(first.as_str()) => {
            rest
        }
        _ => &path[..],
    };
    segments
        .iter()
        .map(|segment| kebab_case(segment))
        .collect::<Vec<_>>()
        .join("-")
}

/// `fontSize` -> `font-size`. Already kebab-cased names are unchanged.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.char_indices() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

fn css_value(value: &StyleValue) -> Option<String> {
    match value {
        StyleValue::Scalar(Scalar::Bool(_)) => None,
        StyleValue::Scalar(scalar) => {
            let text = scalar.to_string();
            (!text.trim().is_empty()).then_some(text)
        }
        StyleValue::List(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    StyleValue::Scalar(Scalar::Bool(_)) => None,
                    StyleValue::Scalar(scalar) => Some(scalar.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        StyleValue::Node(_) => None,
    }
}
