use insta::assert_snapshot;
use serde_json::json;
use vcss::VcssError;
use vcss::generator::{Generator, RendererRegistry};
use vcss::types::{MaxWidth, StyleTree, StyleValue, Viewport, ViewportStyleSet};

fn style(value: serde_json::Value) -> StyleTree {
    StyleValue::from_json(value)
        .and_then(|v| v.as_node().cloned())
        .unwrap_or_default()
}

fn valids(entries: &[(Viewport, serde_json::Value)]) -> ViewportStyleSet {
    let mut set = ViewportStyleSet::new();
    for (viewport, value) in entries {
        set.insert(*viewport, MaxWidth::Unbounded, style(value.clone()));
    }
    set
}

fn border_registry() -> RendererRegistry {
    let mut registry = RendererRegistry::new();
    registry.register_fn("border", 10, |value, options, _| {
        let width = value
            .get("width")
            .and_then(StyleValue::as_scalar)
            .map(ToString::to_string)
            .unwrap_or_default();
        Ok(format!(
            "{sel}{{border-width:{width}}}{sel}:hover{{border-color:red}}",
            sel = options.selector
        ))
    });
    registry
}

#[test]
fn test_fallback_css_for_base_styles() {
    let valids = valids(&[
        (0, json!({ "dimensions": { "padding": 0, "margin": 0 } })),
        (375, json!({ "dimensions": { "padding": 0, "margin": 0 } })),
        (768, json!({ "dimensions": { "padding": 0, "margin": 0 } })),
        (1280, json!({ "dimensions": { "padding": 0, "margin": 0 } })),
    ]);
    let registry = RendererRegistry::new();
    let generator = Generator::new(&valids, "#block-b1", &registry);

    assert_snapshot!(
        generator.generate_css(1280),
        @"#block-b1{margin:0 !important;padding:0 !important}"
    );
}

#[test]
fn test_multi_selector_renderer_output_is_split() {
    let valids = valids(&[
        (0, json!({ "border": { "width": "1px" } })),
        (768, json!({ "border": { "width": "2px" } })),
    ]);
    let registry = border_registry();
    let generator = Generator::new(&valids, "#b", &registry);
    let set = generator.spectrum_set();

    let summary: Vec<_> = set
        .iter()
        .map(|s| (s.selector.as_str(), s.from, s.to))
        .collect();
    assert_eq!(
        summary,
        vec![("#b:hover", 0, None), ("#b", 0, Some(767)), ("#b", 768, None)]
    );
    assert_snapshot!(
        generator.generate_css(1280),
        @"#b:hover{border-color:red !important}@media (min-width:0px) and (max-width:767px){#b{border-width:1px !important}}@media (min-width:768px){#b{border-width:2px !important}}"
    );
}

#[test]
fn test_generate_css_filters_by_current_viewport() {
    let valids = valids(&[
        (0, json!({ "width": "100%" })),
        (768, json!({ "width": "100%", "height": "auto" })),
    ]);
    let registry = RendererRegistry::new();
    let generator = Generator::new(&valids, "#b", &registry);

    assert_snapshot!(generator.generate_css(375), @"#b{width:100% !important}");
    assert_snapshot!(
        generator.generate_css(768),
        @"#b{width:100% !important}@media (min-width:768px){#b{height:auto !important}}"
    );
}

#[test]
fn test_renderers_ordered_by_priority() {
    let valids = valids(&[(0, json!({ "color": "red" }))]);
    let mut registry = RendererRegistry::new();
    registry
        .register_fn("color", 20, |_, options, _| {
            Ok(format!("{}{{outline-color:blue}}", options.selector))
        })
        .register_fn("color", 5, |value, options, _| {
            let color = value.as_scalar().map(ToString::to_string).unwrap_or_default();
            Ok(format!("{}{{color:{color}}}", options.selector))
        });
    let generator = Generator::new(&valids, "#b", &registry);

    let priorities: Vec<_> = generator.spectrum_set().iter().map(|s| s.priority).collect();
    assert_eq!(priorities, vec![5, 20]);
    assert_snapshot!(
        generator.generate_css(0),
        @"#b{color:red !important}#b{outline-color:blue !important}"
    );
}

#[test]
fn test_min_only_rules_precede_min_max_at_same_viewport() {
    let valids = valids(&[
        (0, json!({ "height": "auto", "width": "10px" })),
        (768, json!({ "width": "10px" })),
    ]);
    let registry = RendererRegistry::new();
    let generator = Generator::new(&valids, "#b", &registry);
    let set = generator.spectrum_set();

    assert_eq!(set.spectrums[0].property, "width");
    assert!(set.spectrums[0].is_min_only());
    assert_eq!(set.spectrums[1].property, "height");
    assert_eq!(set.spectrums[1].to, Some(767));
}

#[test]
fn test_failing_renderer_is_isolated() {
    let valids = valids(&[
        (0, json!({ "width": "100%", "height": "auto", "color": "red" })),
        (768, json!({ "width": "50%", "height": "auto", "color": "red" })),
    ]);
    let mut registry = RendererRegistry::new();
    registry
        .register_fn("width", 10, |_, options, _| {
            if options.viewport >= 768 {
                Err(VcssError::renderer("width", "unsupported unit"))
            } else {
                Ok(format!("{}{{width:1px}}", options.selector))
            }
        })
        .register_fn("color", 10, |_, _, _| Ok("color: red;".to_string()));
    let generator = Generator::new(&valids, "#b", &registry);
    let set = generator.spectrum_set();

    let properties: Vec<_> = set.iter().map(|s| s.property.as_str()).collect();
    assert_eq!(properties, vec!["height"]);

    let failed: Vec<_> = set.failures.iter().map(|f| f.property.as_str()).collect();
    assert_eq!(failed, vec!["color", "width"]);
    assert!(set.failures[1].message.contains("unsupported unit"));
}

#[test]
fn test_ties_keep_discovery_order() {
    let valids = valids(&[
        (0, json!({ "layout": { "first": 1, "second": 1 } })),
        (375, json!({ "layout": { "first": 1, "second": 2 } })),
        (768, json!({ "layout": { "first": 2, "second": 2 } })),
    ]);
    let mut registry = RendererRegistry::new();
    registry.register_fn("layout", 10, |value, options, _| {
        let order = |key: &str| {
            value
                .get(key)
                .and_then(StyleValue::as_scalar)
                .map(ToString::to_string)
                .unwrap_or_default()
        };
        Ok(format!(
            "{sel} .first{{order:{first}}}{sel} .second{{order:{second}}}",
            sel = options.selector,
            first = order("first"),
            second = order("second"),
        ))
    });
    let generator = Generator::new(&valids, "#b", &registry);

    let ranges: Vec<_> = generator
        .spectrum_set()
        .iter()
        .map(|s| (s.from, s.to, s.selector.as_str()))
        .collect();
    assert_eq!(
        ranges,
        vec![
            (0, Some(767), "#b .first"),
            (0, Some(374), "#b .second"),
            (375, None, "#b .second"),
            (768, None, "#b .first"),
        ]
    );
}

#[test]
fn test_saving_flag_reaches_renderers() {
    let valids = valids(&[(0, json!({ "width": "1px" }))]);
    let mut registry = RendererRegistry::new();
    registry.register_fn("width", 10, |_, options, is_saving| {
        let width = if is_saving { "2px" } else { "1px" };
        Ok(format!("{}{{width:{width}}}", options.selector))
    });

    let preview = Generator::new(&valids, "#b", &registry);
    let saving = Generator::new(&valids, "#b", &registry).saving(true);
    assert_snapshot!(preview.generate_css(0), @"#b{width:1px !important}");
    assert_snapshot!(saving.generate_css(0), @"#b{width:2px !important}");
}

#[test]
fn test_ranges_never_overlap_per_selector() {
    let valids = valids(&[
        (0, json!({ "border": { "width": "1px" }, "width": "1px" })),
        (375, json!({ "border": { "width": "1px" } })),
        (768, json!({ "border": { "width": "3px" }, "width": "1px" })),
        (1024, json!({ "width": "2px" })),
        (1280, json!({ "border": { "width": "3px" }, "width": "2px" })),
    ]);
    let registry = border_registry();
    let generator = Generator::new(&valids, "#b", &registry);
    let set = generator.spectrum_set();
    assert!(set.failures.is_empty());

    for a in set.iter() {
        for b in set.iter() {
            if std::ptr::eq(a, b) || a.property != b.property || a.selector != b.selector {
                continue;
            }
            let a_end = a.to.unwrap_or(u32::MAX);
            let b_end = b.to.unwrap_or(u32::MAX);
            assert!(
                a_end < b.from || b_end < a.from,
                "overlap: {a} and {b}"
            );
        }
    }
}

#[test]
fn test_spectrum_records_properties_at_start() {
    let valids = valids(&[
        (0, json!({ "spacing": { "padding": { "top": "10px" } } })),
        (768, json!({ "spacing": { "padding": { "top": "20px" } } })),
    ]);
    let registry = RendererRegistry::new();
    let generator = Generator::new(&valids, "#b", &registry);
    let last = generator
        .spectrum_set()
        .for_property("spacing")
        .last()
        .cloned();

    let last = last.unwrap();
    assert_eq!(last.properties.to_json(), json!({ "padding": { "top": "20px" } }));
    assert_eq!(last.css(false), "#b{padding-top:20px}");
}
