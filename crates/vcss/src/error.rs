//! Error types for style trees and CSS generation.
//!
//! This module defines the errors that can occur when splitting renderer
//! output into rules, invoking custom renderers, or reading persisted
//! viewport style sets.

use thiserror::Error;

/// Errors that can occur while building or rendering viewport styles.
///
/// # Examples
///
/// ```rust
/// use vcss::generator::split_rules;
///
/// // Unbalanced braces are rejected rather than partially rendered
/// let result = split_rules(".block { color: red;");
/// assert!(result.is_err());
/// ```
#[derive(Error, Debug)]
pub enum VcssError {
    /// Renderer output was not a sequence of `selector { declarations }` blocks.
    ///
    /// The string contains details about what was unexpected.
    #[error("CSS syntax error: {0}")]
    InvalidSyntax(String),

    /// A custom renderer reported a failure for a property.
    #[error("Renderer for '{property}' failed: {message}")]
    Renderer { property: String, message: String },

    /// A persisted viewport style set did not have the
    /// `viewport -> bucket -> { style }` shape.
    #[error("Invalid viewport style set: {0}")]
    InvalidViewportSet(String),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl VcssError {
    /// Shorthand used by renderers to report a failure for `property`.
    pub fn renderer(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Renderer {
            property: property.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VcssError>;
