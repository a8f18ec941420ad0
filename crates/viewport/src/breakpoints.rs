//! Breakpoint configuration.
//!
//! Breakpoints are `(min-width, label)` pairs, e.g. `(768, "Tablet")`. A
//! viewport is active when the preview width is at least its threshold;
//! the last matching breakpoint wins.
//!
//! The set must contain the base viewport `0`. There is no implicit
//! default: an empty or baseless configuration is a [`ConfigError`].

use std::collections::BTreeMap;

use serde_json::Value;
use vcss::Viewport;

use crate::error::ConfigError;

/// Ordered breakpoint thresholds with display labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoints {
    points: BTreeMap<Viewport, String>,
}

impl Breakpoints {
    pub fn new<I, S>(points: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Viewport, S)>,
        S: Into<String>,
    {
        let points: BTreeMap<Viewport, String> = points
            .into_iter()
            .map(|(px, label)| (px, label.into()))
            .collect();

        if points.is_empty() {
            return Err(ConfigError::NoBreakpoints);
        }
        if !points.contains_key(&0) {
            return Err(ConfigError::MissingBaseBreakpoint);
        }
        Ok(Self { points })
    }

    /// Reads `{ "0": "Base", "768": "Tablet" }`.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let map = value
            .as_object()
            .ok_or_else(|| ConfigError::InvalidBreakpoint(value.to_string()))?;

        let mut points = Vec::with_capacity(map.len());
        for (key, label) in map {
            let px = key
                .trim()
                .parse::<Viewport>()
                .map_err(|_| ConfigError::InvalidBreakpoint(key.clone()))?;
            let label = match label {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            points.push((px, label));
        }
        Self::new(points)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_json(&value)
    }

    /// Thresholds in ascending order, starting with `0`.
    pub fn viewports(&self) -> impl Iterator<Item = Viewport> + '_ {
        self.points.keys().copied()
    }

    pub fn label(&self, viewport: Viewport) -> Option<&str> {
        self.points.get(&viewport).map(String::as_str)
    }

    pub fn contains(&self, viewport: Viewport) -> bool {
        self.points.contains_key(&viewport)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The breakpoint in effect at `width`: the largest threshold <= `width`.
    pub fn active(&self, width: Viewport) -> Viewport {
        self.points
            .range(..=width)
            .next_back()
            .map(|(px, _)| *px)
            .unwrap_or(0)
    }

    /// The next threshold above `viewport`.
    pub fn next_above(&self, viewport: Viewport) -> Option<Viewport> {
        self.points
            .range(viewport.saturating_add(1)..)
            .next()
            .map(|(px, _)| *px)
    }
}
