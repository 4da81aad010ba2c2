//! Record-to-point transformation pipeline.
//!
//! Turns loosely typed JSON records into canonical [`DataPoint`]s, validates
//! point-shaped input, and offers the aggregate/normalize reductions used
//! before layout.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::primitives::{coerce_number, finite_json_number, json_kind};
use crate::core::{DataPoint, Metadata, ValidationReport, XValue};
use crate::error::{ChartError, ChartResult};

pub const AGGREGATION_TYPE_KEY: &str = "aggregationType";
pub const ITEM_COUNT_KEY: &str = "itemCount";
pub const ORIGINAL_ITEMS_KEY: &str = "originalItems";
pub const ORIGINAL_VALUE_KEY: &str = "originalValue";
pub const PERCENTAGE_KEY: &str = "percentage";
/// Metadata key holding a non-object source record.
pub const RAW_RECORD_KEY: &str = "raw";

/// Reduction applied per x group by [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    #[default]
    Sum,
    Average,
    Count,
}

impl AggregationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Count => "count",
        }
    }
}

/// Field names used to read raw records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKeys {
    pub x: String,
    pub y: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl RecordKeys {
    #[must_use]
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Default for RecordKeys {
    fn default() -> Self {
        Self::new("x", "y")
    }
}

/// Maps raw records to data points.
///
/// - `x` falls back to the record index when the field is missing or null.
/// - `y` is coerced to a finite number, defaulting to `0`.
/// - `id` is the record's own `id` when present, else `data-{index}`.
/// - `metadata` holds the full source record.
///
/// Fails only when `records` is not an array.
pub fn transform(records: &Value, keys: &RecordKeys) -> ChartResult<Vec<DataPoint>> {
    let Value::Array(items) = records else {
        return Err(ChartError::NotASequence {
            found: json_kind(records),
        });
    };

    let mut defaulted = 0_usize;
    let points: Vec<DataPoint> = items
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let field = |name: &str| record.as_object().and_then(|object| object.get(name));

            let x = match field(&keys.x) {
                None | Some(Value::Null) => XValue::from(index),
                Some(value) => x_from_json(value),
            };

            let y = match field(&keys.y).and_then(coerce_number) {
                Some(y) if y.is_finite() => y,
                _ => {
                    defaulted += 1;
                    warn!(index, "y not coercible, defaulting to 0");
                    0.0
                }
            };

            let label = keys
                .label
                .as_deref()
                .and_then(|name| field(name))
                .and_then(scalar_text);

            let id = field("id")
                .and_then(scalar_text)
                .unwrap_or_else(|| format!("data-{index}"));

            let metadata = match record {
                Value::Object(object) => object
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
                other => {
                    let mut metadata = Metadata::new();
                    metadata.insert(RAW_RECORD_KEY.to_owned(), other.clone());
                    metadata
                }
            };

            DataPoint {
                x,
                y,
                label,
                id: Some(id),
                metadata,
            }
        })
        .collect();

    debug!(
        count = points.len(),
        defaulted_y = defaulted,
        "transform records"
    );
    Ok(points)
}

fn x_from_json(value: &Value) -> XValue {
    match value {
        Value::Number(number) => number
            .as_f64()
            .map_or_else(|| XValue::Text(number.to_string()), XValue::Number),
        Value::String(text) => XValue::Text(text.clone()),
        other => XValue::Text(other.to_string()),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Checks point-shaped input without failing.
///
/// Every element is inspected; all problems accumulate into one report.
#[must_use]
pub fn validate(data: &Value) -> ValidationReport {
    let Value::Array(items) = data else {
        return ValidationReport::invalid("data must be an array");
    };
    if items.is_empty() {
        return ValidationReport::invalid("data array must not be empty");
    }

    let mut report = ValidationReport::valid();
    for (index, item) in items.iter().enumerate() {
        let Value::Object(object) = item else {
            report.push(format!("item {index} must be an object"));
            continue;
        };
        match object.get("x") {
            None | Some(Value::Null) => report.push(format!("item {index} is missing `x`")),
            Some(_) => {}
        }
        match object.get("y") {
            None | Some(Value::Null) => report.push(format!("item {index} is missing `y`")),
            Some(Value::Number(number)) if number.as_f64().is_some_and(f64::is_finite) => {}
            Some(_) => report.push(format!("item {index} has a non-numeric `y`")),
        }
    }
    report
}

/// Collapses points sharing an x key into one point per key.
///
/// Groups keep first-seen order. Each output point keeps the first member's
/// `x` and label and records the aggregation in its metadata.
#[must_use]
pub fn aggregate(data: &[DataPoint], kind: AggregationKind) -> Vec<DataPoint> {
    let mut groups: IndexMap<String, Vec<&DataPoint>> = IndexMap::new();
    for point in data {
        groups.entry(point.key()).or_default().push(point);
    }

    let aggregated: Vec<DataPoint> = groups
        .into_values()
        .map(|items| {
            let count = items.len();
            let sum: f64 = items.iter().map(|point| point.y).sum();
            let y = match kind {
                AggregationKind::Sum => sum,
                AggregationKind::Average => sum / count as f64,
                AggregationKind::Count => count as f64,
            };

            let first = items[0];
            let mut metadata = Metadata::new();
            metadata.insert(
                AGGREGATION_TYPE_KEY.to_owned(),
                Value::String(kind.as_str().to_owned()),
            );
            metadata.insert(ITEM_COUNT_KEY.to_owned(), Value::from(count));
            metadata.insert(
                ORIGINAL_ITEMS_KEY.to_owned(),
                serde_json::to_value(&items).unwrap_or_default(),
            );

            DataPoint {
                x: first.x.clone(),
                y,
                label: first.label.clone(),
                id: None,
                metadata,
            }
        })
        .collect();

    debug!(
        input = data.len(),
        groups = aggregated.len(),
        kind = kind.as_str(),
        "aggregate points"
    );
    aggregated
}

/// Rescales `y` to a percentage of the total absolute magnitude.
///
/// A zero total returns the input unchanged.
#[must_use]
pub fn normalize(data: &[DataPoint]) -> Vec<DataPoint> {
    let total: f64 = data.iter().map(|point| point.y.abs()).sum();
    if total == 0.0 {
        debug!(count = data.len(), "normalize skipped, zero total");
        return data.to_vec();
    }

    data.iter()
        .map(|point| {
            let percentage = point.y / total * 100.0;
            let mut normalized = point.clone();
            normalized.y = percentage;
            normalized
                .metadata
                .insert(ORIGINAL_VALUE_KEY.to_owned(), finite_json_number(point.y));
            normalized
                .metadata
                .insert(PERCENTAGE_KEY.to_owned(), finite_json_number(percentage));
            normalized
        })
        .collect()
}
