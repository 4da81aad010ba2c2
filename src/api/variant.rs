use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::series_registry::SERIES_KEY;
use crate::core::{
    DataPoint, Series, SeriesRegistry, StackOffset, StackOrder, ValidationReport, validate,
};
use crate::error::{ChartError, ChartResult};

/// Metadata key accepted as an alternative series discriminator.
pub const CATEGORY_KEY: &str = "category";
/// Above this many points per series the stacked variant is recommended.
pub const STACKED_POINTS_PER_SERIES_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartVariant {
    Simple,
    Grouped,
    Stacked,
}

impl ChartVariant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Grouped => "grouped",
            Self::Stacked => "stacked",
        }
    }
}

impl fmt::Display for ChartVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartVariant {
    type Err = ChartError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "simple" => Ok(Self::Simple),
            "grouped" => Ok(Self::Grouped),
            "stacked" => Ok(Self::Stacked),
            other => Err(ChartError::UnsupportedVariant(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
    pub background: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "light".to_owned(),
            background: "#ffffff".to_owned(),
            text_color: "#262626".to_owned(),
            font_family: "system-ui, sans-serif".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub duration_ms: u32,
    pub easing: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: 300,
            easing: "ease-out".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    pub enabled: bool,
    pub keyboard_navigation: bool,
    pub announce_changes: bool,
    pub description: Option<String>,
}

impl Default for AccessibilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keyboard_navigation: true,
            announce_changes: true,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValuePosition {
    #[default]
    Outside,
    Inside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    Right,
    #[default]
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleOptions {
    pub padding: f64,
    pub show_values: bool,
    pub value_position: ValuePosition,
    pub value_decimals: u8,
}

impl Default for SimpleOptions {
    fn default() -> Self {
        Self {
            padding: 0.1,
            show_values: false,
            value_position: ValuePosition::Outside,
            value_decimals: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupedOptions {
    pub group_padding: f64,
    pub series_padding: f64,
    pub show_legend: bool,
    pub legend_position: LegendPosition,
    pub colors: Vec<String>,
}

impl Default for GroupedOptions {
    fn default() -> Self {
        Self {
            group_padding: 0.1,
            series_padding: 0.05,
            show_legend: true,
            legend_position: LegendPosition::Bottom,
            colors: default_palette(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackedOptions {
    pub padding: f64,
    pub order: StackOrder,
    pub offset: StackOffset,
    pub show_totals: bool,
    pub show_legend: bool,
    pub colors: Vec<String>,
}

impl Default for StackedOptions {
    fn default() -> Self {
        Self {
            padding: 0.1,
            order: StackOrder::None,
            offset: StackOffset::None,
            show_totals: true,
            show_legend: true,
            colors: default_palette(),
        }
    }
}

/// Categorical palette shared by multi-series variants.
#[must_use]
pub fn default_palette() -> Vec<String> {
    [
        "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Variant-specific options, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VariantOptions {
    Simple(SimpleOptions),
    Grouped(GroupedOptions),
    Stacked(StackedOptions),
}

impl VariantOptions {
    #[must_use]
    pub fn defaults_for(variant: ChartVariant) -> Self {
        match variant {
            ChartVariant::Simple => Self::Simple(SimpleOptions::default()),
            ChartVariant::Grouped => Self::Grouped(GroupedOptions::default()),
            ChartVariant::Stacked => Self::Stacked(StackedOptions::default()),
        }
    }

    #[must_use]
    pub fn variant(&self) -> ChartVariant {
        match self {
            Self::Simple(_) => ChartVariant::Simple,
            Self::Grouped(_) => ChartVariant::Grouped,
            Self::Stacked(_) => ChartVariant::Stacked,
        }
    }
}

/// Shared base configuration plus variant options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartVariantConfig {
    pub theme: ThemeConfig,
    pub animation: AnimationConfig,
    pub accessibility: AccessibilityConfig,
    pub options: VariantOptions,
}

impl ChartVariantConfig {
    #[must_use]
    pub fn defaults_for(variant: ChartVariant) -> Self {
        Self {
            theme: ThemeConfig::default(),
            animation: AnimationConfig::default(),
            accessibility: AccessibilityConfig::default(),
            options: VariantOptions::defaults_for(variant),
        }
    }

    /// Deep-merges a JSON override object onto this config.
    ///
    /// Unknown keys are skipped with a warning; values of the wrong shape and
    /// attempts to switch the options `kind` are errors.
    pub fn merged_with(self, overrides: &Value) -> ChartResult<Self> {
        let Value::Object(_) = overrides else {
            return Err(ChartError::InvalidConfig(
                "variant overrides must be a JSON object".to_owned(),
            ));
        };
        let variant = self.options.variant();
        let mut merged = serde_json::to_value(&self).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to serialize variant defaults: {e}"))
        })?;
        merge_known(&mut merged, overrides, "");

        let config: Self = serde_json::from_value(merged)
            .map_err(|e| ChartError::InvalidConfig(format!("invalid variant override: {e}")))?;
        if config.options.variant() != variant {
            return Err(ChartError::InvalidConfig(format!(
                "options kind `{}` does not match variant `{variant}`",
                config.options.variant()
            )));
        }
        Ok(config)
    }
}

fn merge_known(target: &mut Value, overrides: &Value, path: &str) {
    let (Value::Object(target), Value::Object(overrides)) = (target, overrides) else {
        return;
    };
    for (key, value) in overrides {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        let Some(slot) = target.get_mut(key) else {
            warn!(key = %key_path, "ignoring unknown config override");
            continue;
        };
        if slot.is_object() && value.is_object() {
            merge_known(slot, value, &key_path);
        } else {
            *slot = value.clone();
        }
    }
}

/// Either prepared series or flat points tagged with series metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartData {
    Series(Vec<Series>),
    Points(Vec<DataPoint>),
}

impl ChartData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Series(series) => series.is_empty(),
            Self::Points(points) => points.is_empty(),
        }
    }

    /// Flat view; series input is flattened with series annotations.
    #[must_use]
    pub fn points(&self) -> Vec<DataPoint> {
        match self {
            Self::Points(points) => points.clone(),
            Self::Series(series) => registry_of(series).flatten(),
        }
    }

    /// Visible series; flat points are bucketed by their `series` metadata,
    /// falling back to `category`.
    #[must_use]
    pub fn series(&self) -> Vec<Series> {
        match self {
            Self::Series(series) => series
                .iter()
                .filter(|series| series.is_visible())
                .cloned()
                .collect(),
            Self::Points(points) => {
                let tagged: Vec<DataPoint> = points.iter().map(with_series_tag).collect();
                SeriesRegistry::from_flat_data(&tagged, SERIES_KEY).visible_series()
            }
        }
    }

    /// Soft validation of this data against `variant`.
    #[must_use]
    pub fn validate_for(&self, variant: ChartVariant) -> ValidationReport {
        match serde_json::to_value(self) {
            Ok(value) => validate_variant_data(variant, &value),
            Err(e) => ValidationReport::invalid(format!("data cannot be serialized: {e}")),
        }
    }
}

/// Copies a `category` discriminator into `series` so flat points bucket
/// the same way they validate.
fn with_series_tag(point: &DataPoint) -> DataPoint {
    let mut point = point.clone();
    if !point.metadata.contains_key(SERIES_KEY) {
        if let Some(tag) = point_series_tag(&point) {
            point.metadata.insert(SERIES_KEY.to_owned(), Value::String(tag));
        }
    }
    point
}

fn registry_of(series: &[Series]) -> SeriesRegistry {
    let mut registry = SeriesRegistry::new();
    for series in series {
        registry.add_series(series.clone());
    }
    registry
}

/// Fully resolved variant: merged config plus the data it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartVariantSpec {
    pub variant: ChartVariant,
    pub config: ChartVariantConfig,
    pub data: ChartData,
}

/// Merges base defaults, variant defaults and caller overrides (caller wins).
pub fn create_chart_variant(
    variant: &str,
    data: ChartData,
    overrides: Option<&Value>,
) -> ChartResult<ChartVariantSpec> {
    let variant = ChartVariant::from_str(variant)?;
    let defaults = ChartVariantConfig::defaults_for(variant);
    let config = match overrides {
        Some(overrides) => defaults.merged_with(overrides)?,
        None => defaults,
    };
    debug!(%variant, overridden = overrides.is_some(), "create chart variant");
    Ok(ChartVariantSpec {
        variant,
        config,
        data,
    })
}

/// Checks raw input shape for `variant`, collecting every problem.
///
/// `simple` wants a flat point array. `grouped` and `stacked` take either a
/// series array (detected from `id`, `label` and `data` on the first
/// element) or flat points carrying `series`/`category` metadata.
#[must_use]
pub fn validate_variant_data(variant: ChartVariant, data: &Value) -> ValidationReport {
    let Value::Array(items) = data else {
        return ValidationReport::invalid(format!("{variant} data must be an array"));
    };
    if items.is_empty() {
        return ValidationReport::invalid(format!("{variant} data must not be empty"));
    }

    let series_shaped = items.first().is_some_and(looks_like_series);
    let mut report = ValidationReport::valid();
    match variant {
        ChartVariant::Simple => {
            if series_shaped {
                report.push("simple variant expects data points, not series");
                return report;
            }
            report.extend(validate(data));
        }
        ChartVariant::Grouped | ChartVariant::Stacked => {
            if series_shaped {
                for (index, item) in items.iter().enumerate() {
                    check_series(item, index, &mut report);
                }
            } else {
                for (index, item) in items.iter().enumerate() {
                    let context = format!("point {index}");
                    if check_point(item, &context, &mut report) && series_tag(item).is_none() {
                        report.push(format!(
                            "{context}: missing `{SERIES_KEY}` or `{CATEGORY_KEY}` metadata"
                        ));
                    }
                }
            }
        }
    }
    report
}

fn looks_like_series(item: &Value) -> bool {
    item.as_object().is_some_and(|object| {
        object.contains_key("id") && object.contains_key("label") && object.contains_key("data")
    })
}

/// Returns `true` when `item` is at least an object.
fn check_point(item: &Value, context: &str, report: &mut ValidationReport) -> bool {
    let Value::Object(object) = item else {
        report.push(format!("{context}: must be an object"));
        return false;
    };
    if matches!(object.get("x"), None | Some(Value::Null)) {
        report.push(format!("{context}: missing `x`"));
    }
    match object.get("y") {
        Some(Value::Number(number)) if number.as_f64().is_some_and(f64::is_finite) => {}
        None | Some(Value::Null) => report.push(format!("{context}: missing `y`")),
        Some(_) => report.push(format!("{context}: `y` must be a number")),
    }
    true
}

fn check_series(item: &Value, index: usize, report: &mut ValidationReport) {
    let Value::Object(object) = item else {
        report.push(format!("series {index}: must be an object"));
        return;
    };
    let name = match object.get("id") {
        Some(Value::String(id)) if !id.is_empty() => format!("series `{id}`"),
        _ => {
            report.push(format!("series {index}: `id` must be a non-empty string"));
            format!("series {index}")
        }
    };
    if !matches!(object.get("label"), Some(Value::String(_))) {
        report.push(format!("{name}: `label` must be a string"));
    }
    let Some(Value::Array(points)) = object.get("data") else {
        report.push(format!("{name}: `data` must be an array"));
        return;
    };
    for (point_index, point) in points.iter().enumerate() {
        check_point(point, &format!("{name} point {point_index}"), report);
    }
}

fn series_tag(item: &Value) -> Option<String> {
    let metadata = item.get("metadata")?.as_object()?;
    [SERIES_KEY, CATEGORY_KEY]
        .into_iter()
        .find_map(|key| metadata.get(key))
        .and_then(tag_text)
}

fn point_series_tag(point: &DataPoint) -> Option<String> {
    [SERIES_KEY, CATEGORY_KEY]
        .into_iter()
        .find_map(|key| point.metadata.get(key))
        .and_then(tag_text)
}

fn tag_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Suggests a variant from the series structure of flat points.
///
/// No series metadata, or a single series, means `simple`. Otherwise many
/// points per series favor `stacked` and few favor `grouped`.
#[must_use]
pub fn get_recommended_variant(data: &[DataPoint]) -> ChartVariant {
    let tags: IndexSet<String> = data.iter().filter_map(point_series_tag).collect();
    if tags.len() <= 1 {
        return ChartVariant::Simple;
    }
    let points_per_series = data.len() as f64 / tags.len() as f64;
    if points_per_series > STACKED_POINTS_PER_SERIES_THRESHOLD {
        ChartVariant::Stacked
    } else {
        ChartVariant::Grouped
    }
}
