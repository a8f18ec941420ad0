//! Breakpoint-aware block styles.
//!
//! This crate ties together [`vcss`] (style trees and CSS generation) and
//! [`viewport`] (the per-breakpoint style store).

pub mod error;

pub use error::{Error, Result};
pub use vcss::generator::{Generator, RendererRegistry, Spectrum, SpectrumSet};
pub use vcss::{MaxWidth, StyleTree, StyleValue, Viewport, ViewportStyleSet};
pub use viewport::{Action, Breakpoints, SaveLifecycleObserver, StateChanges, Store};

/// Builds a store from a JSON breakpoint map such as `{"0":"Base","768":"Tablet"}`.
pub fn store_from_config(breakpoints: &str, registry: RendererRegistry) -> Result<Store> {
    let breakpoints = Breakpoints::from_json_str(breakpoints)?;
    Ok(Store::new(breakpoints, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_from_config() {
        let mut store = store_from_config(r#"{"0":"Base","768":"Tablet"}"#, RendererRegistry::new()).unwrap();
        store
            .dispatch(Action::RegisterBlockInit {
                id: "b1".into(),
                attributes: json!({ "style": { "width": "100%" } }),
            })
            .unwrap();
        assert_eq!(store.get_css("b1").unwrap(), "#block-b1{width:100% !important}");
    }

    #[test]
    fn test_config_errors_convert() {
        let err = store_from_config(r#"{"768":"Tablet"}"#, RendererRegistry::new()).unwrap_err();
        assert!(matches!(err, Error::Config(viewport::ConfigError::MissingBaseBreakpoint)));

        let err = store_from_config("not json", RendererRegistry::new()).unwrap_err();
        assert!(matches!(err, Error::Config(viewport::ConfigError::Json(_))));
    }
}
