use std::str::FromStr;

use bandchart_rs::ChartError;
use bandchart_rs::api::{
    ChartData, ChartVariant, ChartVariantConfig, VariantOptions, create_chart_variant,
    get_recommended_variant, validate_variant_data,
};
use bandchart_rs::core::{DataPoint, Series, StackOffset, StackOrder};
use serde_json::json;

fn sample_points() -> ChartData {
    ChartData::Points(vec![DataPoint::new("A", 1.0), DataPoint::new("B", 2.0)])
}

fn tagged(series: &str, count: usize) -> Vec<DataPoint> {
    (0..count)
        .map(|i| DataPoint::new(i, 1.0).with_metadata("series", series))
        .collect()
}

#[test]
fn variant_names_parse_and_unknown_names_fail() {
    assert_eq!(
        ChartVariant::from_str("stacked").expect("known"),
        ChartVariant::Stacked
    );
    assert_eq!(ChartVariant::Grouped.to_string(), "grouped");

    let err = create_chart_variant("pie", sample_points(), None).expect_err("unsupported");
    assert_eq!(err, ChartError::UnsupportedVariant("pie".to_owned()));
}

#[test]
fn defaults_merge_base_and_variant_sections() {
    let spec = create_chart_variant("grouped", sample_points(), None).expect("grouped");

    assert_eq!(spec.variant, ChartVariant::Grouped);
    assert!(spec.config.animation.enabled);
    assert!(spec.config.accessibility.keyboard_navigation);
    assert_eq!(spec.config.theme.name, "light");
    let VariantOptions::Grouped(options) = &spec.config.options else {
        panic!("expected grouped options, got {:?}", spec.config.options);
    };
    assert_eq!(options.group_padding, 0.1);
    assert_eq!(options.series_padding, 0.05);
    assert!(options.show_legend);
    assert!(!options.colors.is_empty());
}

#[test]
fn caller_overrides_win_and_keep_sibling_defaults() {
    let overrides = json!({
        "theme": { "name": "dark" },
        "options": { "order": "descending", "offset": "expand", "show_totals": false }
    });
    let spec =
        create_chart_variant("stacked", sample_points(), Some(&overrides)).expect("stacked");

    assert_eq!(spec.config.theme.name, "dark");
    assert_eq!(spec.config.theme.background, "#ffffff");
    let VariantOptions::Stacked(options) = &spec.config.options else {
        panic!("expected stacked options, got {:?}", spec.config.options);
    };
    assert_eq!(options.order, StackOrder::Descending);
    assert_eq!(options.offset, StackOffset::Expand);
    assert!(!options.show_totals);
    assert_eq!(options.padding, 0.1);
}

#[test]
fn unknown_override_keys_are_ignored() {
    let overrides = json!({ "bogus": 1, "animation": { "speed": 3 } });
    let spec = create_chart_variant("simple", sample_points(), Some(&overrides)).expect("simple");

    assert_eq!(
        spec.config,
        ChartVariantConfig::defaults_for(ChartVariant::Simple)
    );
}

#[test]
fn optional_fields_accept_overrides() {
    let overrides = json!({ "accessibility": { "description": "Quarterly revenue" } });
    let spec = create_chart_variant("simple", sample_points(), Some(&overrides)).expect("simple");

    assert_eq!(
        spec.config.accessibility.description.as_deref(),
        Some("Quarterly revenue")
    );
}

#[test]
fn malformed_overrides_are_config_errors() {
    let wrong_type = json!({ "animation": { "enabled": "yes" } });
    assert!(matches!(
        create_chart_variant("simple", sample_points(), Some(&wrong_type)),
        Err(ChartError::InvalidConfig(_))
    ));

    let switched_kind = json!({ "options": { "kind": "grouped" } });
    assert!(matches!(
        create_chart_variant("stacked", sample_points(), Some(&switched_kind)),
        Err(ChartError::InvalidConfig(_))
    ));

    assert!(matches!(
        create_chart_variant("simple", sample_points(), Some(&json!([1, 2]))),
        Err(ChartError::InvalidConfig(_))
    ));
}

#[test]
fn simple_variant_wants_flat_points() {
    let report = validate_variant_data(ChartVariant::Simple, &json!([{ "x": "A", "y": 1 }]));
    assert!(report.is_valid);

    let report = validate_variant_data(
        ChartVariant::Simple,
        &json!([{ "id": "s1", "label": "S1", "data": [] }]),
    );
    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec!["simple variant expects data points, not series".to_owned()]
    );

    let report = validate_variant_data(ChartVariant::Simple, &json!([{ "x": "A", "y": "1" }]));
    assert_eq!(report.errors, vec!["item 0 has a non-numeric `y`".to_owned()]);
}

#[test]
fn series_input_errors_are_series_qualified() {
    let data = json!([
        { "id": "s1", "label": "S1", "data": [{ "x": "A", "y": 1 }, { "x": "B", "y": "two" }] },
        { "id": "s2", "label": 7, "data": "none" }
    ]);

    let report = validate_variant_data(ChartVariant::Grouped, &data);
    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec![
            "series `s1` point 1: `y` must be a number".to_owned(),
            "series `s2`: `label` must be a string".to_owned(),
            "series `s2`: `data` must be an array".to_owned(),
        ]
    );
}

#[test]
fn flat_multi_series_input_needs_series_metadata() {
    let data = json!([
        { "x": "A", "y": 1, "metadata": { "series": "north" } },
        { "x": "A", "y": 2, "metadata": { "category": "south" } },
        { "x": "B", "y": 3 }
    ]);

    let report = validate_variant_data(ChartVariant::Stacked, &data);
    assert_eq!(
        report.errors,
        vec!["point 2: missing `series` or `category` metadata".to_owned()]
    );
}

#[test]
fn empty_and_non_array_inputs_are_invalid() {
    assert!(!validate_variant_data(ChartVariant::Grouped, &json!([])).is_valid);
    assert!(!validate_variant_data(ChartVariant::Stacked, &json!({ "x": 1 })).is_valid);
}

#[test]
fn typed_data_validates_through_its_json_form() {
    let series = ChartData::Series(vec![Series::new(
        "s1",
        "S1",
        vec![DataPoint::new("A", 1.0)],
    )]);
    assert!(series.validate_for(ChartVariant::Stacked).is_valid);
    assert!(!series.validate_for(ChartVariant::Simple).is_valid);

    let raw = json!([{ "id": "s1", "label": "S1", "data": [{ "x": "A", "y": 1.0 }] }]);
    let parsed: ChartData = serde_json::from_value(raw).expect("series json");
    assert_eq!(parsed, series);
}

#[test]
fn recommendation_follows_series_structure() {
    let plain = vec![DataPoint::new("A", 1.0), DataPoint::new("B", 2.0)];
    assert_eq!(get_recommended_variant(&plain), ChartVariant::Simple);

    assert_eq!(get_recommended_variant(&tagged("only", 8)), ChartVariant::Simple);

    let few: Vec<DataPoint> = [tagged("a", 3), tagged("b", 3)].concat();
    assert_eq!(get_recommended_variant(&few), ChartVariant::Grouped);

    let five_each: Vec<DataPoint> = [tagged("a", 5), tagged("b", 5)].concat();
    assert_eq!(get_recommended_variant(&five_each), ChartVariant::Grouped);

    let many: Vec<DataPoint> = [tagged("a", 6), tagged("b", 6)].concat();
    assert_eq!(get_recommended_variant(&many), ChartVariant::Stacked);
}

#[test]
fn config_serializes_options_with_kind_tag() {
    let config = ChartVariantConfig::defaults_for(ChartVariant::Stacked);
    let value = serde_json::to_value(&config).expect("serializable");

    assert_eq!(value["options"]["kind"], json!("stacked"));
    assert_eq!(value["options"]["order"], json!("none"));
    let back: ChartVariantConfig = serde_json::from_value(value).expect("deserializable");
    assert_eq!(back, config);
}
