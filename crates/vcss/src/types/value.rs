//! Style values: the typed shape of a block's `style` attribute.
//!
//! A block's style attribute is an arbitrarily deep tree of property names
//! mapping to scalars, nested groups, or ordered lists:
//!
//! ```json
//! { "spacing": { "padding": { "top": "10px" } }, "layers": [ { "color": "red" } ] }
//! ```
//!
//! JSON `null` has no style meaning; it is dropped on conversion so that
//! `{ "width": null }` reads the same as `{}`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// An ordered mapping of property names to style values.
pub type StyleTree = BTreeMap<String, StyleValue>;

/// A leaf value in a style tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A node in a style tree.
///
/// Lists are compared and replaced as a whole; only `Node` values merge
/// key by key.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Scalar(Scalar),
    Node(StyleTree),
    List(Vec<StyleValue>),
}

impl StyleValue {
    /// An empty group.
    pub fn empty() -> Self {
        StyleValue::Node(StyleTree::new())
    }

    pub fn as_node(&self) -> Option<&StyleTree> {
        match self {
            StyleValue::Node(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut StyleTree> {
        match self {
            StyleValue::Node(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            StyleValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, StyleValue::Node(_))
    }

    /// Looks up a direct child of a node value.
    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.as_node().and_then(|tree| tree.get(key))
    }

    /// Converts a JSON value, dropping `null`s at every depth.
    ///
    /// Returns `None` when the value itself is `null`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(StyleValue::Scalar(Scalar::Bool(b))),
            Value::Number(n) => n.as_f64().map(|n| StyleValue::Scalar(Scalar::Number(n))),
            Value::String(s) => Some(StyleValue::Scalar(Scalar::String(s))),
            Value::Array(items) => Some(StyleValue::List(
                items.into_iter().filter_map(StyleValue::from_json).collect(),
            )),
            Value::Object(map) => Some(StyleValue::Node(tree_from_json(map))),
        }
    }

    /// Converts back to plain JSON. Integral numbers are written as integers.
    pub fn to_json(&self) -> Value {
        match self {
            StyleValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            StyleValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            StyleValue::Scalar(Scalar::Number(n)) => number_to_json(*n),
            StyleValue::List(items) => Value::Array(items.iter().map(StyleValue::to_json).collect()),
            StyleValue::Node(tree) => tree_to_json(tree),
        }
    }
}

/// Converts a JSON object into a style tree, dropping `null` members.
pub fn tree_from_json(map: Map<String, Value>) -> StyleTree {
    map.into_iter()
        .filter_map(|(key, value)| StyleValue::from_json(value).map(|v| (key, v)))
        .collect()
}

/// Converts a style tree into a JSON object.
pub fn tree_to_json(tree: &StyleTree) -> Value {
    Value::Object(
        tree.iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl Serialize for StyleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StyleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        StyleValue::from_json(value)
            .ok_or_else(|| serde::de::Error::custom("style value cannot be null"))
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Scalar(Scalar::String(s))
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Scalar(Scalar::Number(n))
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Scalar(Scalar::Number(f64::from(n)))
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Scalar(Scalar::Bool(b))
    }
}

impl From<StyleTree> for StyleValue {
    fn from(tree: StyleTree) -> Self {
        StyleValue::Node(tree)
    }
}

impl From<Vec<StyleValue>> for StyleValue {
    fn from(items: Vec<StyleValue>) -> Self {
        StyleValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nulls_are_dropped_at_every_depth() {
        let value = StyleValue::from_json(json!({
            "width": null,
            "spacing": { "padding": null, "margin": "0" },
            "layers": [null, "a"]
        }))
        .unwrap();

        let tree = value.as_node().unwrap();
        assert!(!tree.contains_key("width"));
        let spacing = tree["spacing"].as_node().unwrap();
        assert_eq!(spacing.len(), 1);
        assert_eq!(tree["layers"], StyleValue::List(vec!["a".into()]));
    }

    #[test]
    fn test_integral_numbers_stay_integers_in_json() {
        let value = StyleValue::from_json(json!({ "padding": 0, "opacity": 0.5 })).unwrap();
        assert_eq!(value.to_json(), json!({ "padding": 0, "opacity": 0.5 }));
    }

    #[test]
    fn test_scalar_display_matches_css_text() {
        assert_eq!(Scalar::Number(0.0).to_string(), "0");
        assert_eq!(Scalar::Number(1.5).to_string(), "1.5");
        assert_eq!(Scalar::String("10px".into()).to_string(), "10px");
    }
}
