use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    DataPoint, Dimensions, GroupPadding, LabelRotation, Orientation, Rect, Series,
    StackedLayoutOptions, ValueScale, Viewport, calculate_grouped_layout, calculate_simple_layout,
    calculate_stack_totals, calculate_stacked_layout, get_optimal_orientation_tuned,
    get_recommended_dimensions_tuned, should_rotate_labels_tuned,
};
use crate::error::{ChartError, ChartResult};

use super::{ChartVariant, ChartVariantSpec, EngineConfig, VariantOptions};

pub const CHART_GEOMETRY_JSON_SCHEMA_V1: u32 = 1;
/// Tick count requested for the value axis.
pub const VALUE_AXIS_TICK_COUNT: usize = 10;

/// One placed mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRect {
    /// `None` for the simple variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    pub category: String,
    pub value: f64,
    pub rect: Rect,
}

/// Everything a rendering layer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    pub variant: ChartVariant,
    pub viewport: Viewport,
    pub orientation: Orientation,
    pub label_rotation: LabelRotation,
    /// Category keys in band order.
    pub categories: Vec<String>,
    /// Niced value domain.
    pub value_domain: (f64, f64),
    pub value_ticks: Vec<f64>,
    pub rects: Vec<PlacedRect>,
    /// Raw per-category sums, stacked variant only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<IndexMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometryJsonContractV1 {
    pub schema_version: u32,
    pub geometry: ChartGeometry,
}

impl ChartGeometry {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize geometry: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartGeometryJsonContractV1 {
            schema_version: CHART_GEOMETRY_JSON_SCHEMA_V1,
            geometry: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize geometry contract v1: {e}"))
        })
    }

    /// Accepts either a bare geometry or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(geometry) = serde_json::from_str::<ChartGeometry>(input) {
            return Ok(geometry);
        }
        let payload: ChartGeometryJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse geometry json payload: {e}"))
        })?;
        if payload.schema_version != CHART_GEOMETRY_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported geometry schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.geometry)
    }

    /// Marks belonging to `series_id`, in placement order.
    pub fn rects_for_series<'a>(
        &'a self,
        series_id: &'a str,
    ) -> impl Iterator<Item = &'a PlacedRect> {
        self.rects
            .iter()
            .filter(move |placed| placed.series_id.as_deref() == Some(series_id))
    }
}

/// Runs the full pipeline for a resolved variant: orientation, scales,
/// stacking and mark placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutEngine {
    config: EngineConfig,
}

impl LayoutEngine {
    pub fn new(config: EngineConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Orientation the engine would pick for `spec` in `viewport`.
    pub fn orientation_for(&self, spec: &ChartVariantSpec, viewport: Viewport) -> Orientation {
        self.config.orientation.unwrap_or_else(|| {
            get_optimal_orientation_tuned(
                &category_points(spec),
                f64::from(viewport.width),
                f64::from(viewport.height),
                self.config.heuristics,
            )
        })
    }

    /// Canvas size suggested for `spec`; the non-categorical axis keeps
    /// `viewport` when given.
    pub fn recommended_dimensions(
        &self,
        spec: &ChartVariantSpec,
        orientation: Orientation,
        viewport: Option<Viewport>,
    ) -> Dimensions {
        get_recommended_dimensions_tuned(
            &category_points(spec),
            orientation,
            viewport.map(|viewport| f64::from(viewport.width)),
            viewport.map(|viewport| f64::from(viewport.height)),
            self.config.heuristics,
        )
    }

    pub fn layout(
        &self,
        spec: &ChartVariantSpec,
        viewport: Viewport,
    ) -> ChartResult<ChartGeometry> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if spec.config.options.variant() != spec.variant {
            return Err(ChartError::InvalidConfig(format!(
                "options kind `{}` does not match variant `{}`",
                spec.config.options.variant(),
                spec.variant
            )));
        }
        let report = spec.data.validate_for(spec.variant);
        if !report.is_valid {
            return Err(ChartError::InvalidData(report.errors.join("; ")));
        }

        let orientation = self.orientation_for(spec, viewport);
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);

        let placed = match &spec.config.options {
            VariantOptions::Simple(options) => {
                let points = spec.data.points();
                let layout =
                    calculate_simple_layout(&points, width, height, options.padding, orientation)?;
                let rects = points
                    .iter()
                    .map(|point| {
                        Ok(PlacedRect {
                            series_id: None,
                            category: point.key(),
                            value: point.y,
                            rect: layout.position(point)?,
                        })
                    })
                    .collect::<ChartResult<Vec<_>>>()?;
                Placed {
                    categories: layout.band.keys().map(str::to_owned).collect(),
                    value_scale: layout.value_scale,
                    rects,
                    totals: None,
                }
            }
            VariantOptions::Grouped(options) => {
                let series = spec.data.series();
                let padding = GroupPadding {
                    group: options.group_padding,
                    series: options.series_padding,
                };
                let layout = calculate_grouped_layout(&series, width, height, padding, orientation)?;
                let mut rects = Vec::new();
                for series in &series {
                    for point in &series.data {
                        rects.push(PlacedRect {
                            series_id: Some(series.id.clone()),
                            category: point.key(),
                            value: point.y,
                            rect: layout.get_grouped_bar_position(point, &series.id)?,
                        });
                    }
                }
                Placed {
                    categories: layout.categories.keys().map(str::to_owned).collect(),
                    value_scale: layout.value_scale,
                    rects,
                    totals: None,
                }
            }
            VariantOptions::Stacked(options) => {
                let series = spec.data.series();
                let layout = calculate_stacked_layout(
                    &series,
                    width,
                    height,
                    StackedLayoutOptions {
                        padding: options.padding,
                        order: options.order,
                        offset: options.offset,
                        orientation,
                    },
                )?;
                let mut rects = Vec::new();
                for layer in &layout.stack.layers {
                    for segment in &layer.segments {
                        rects.push(PlacedRect {
                            series_id: Some(layer.series_id.clone()),
                            category: segment.category.clone(),
                            value: segment.value,
                            rect: layout.segment_position(segment)?,
                        });
                    }
                }
                Placed {
                    categories: layout.stack.categories.clone(),
                    value_scale: layout.value_scale,
                    rects,
                    totals: options.show_totals.then(|| calculate_stack_totals(&series)),
                }
            }
        };

        let label_rotation = match orientation {
            Orientation::Vertical if self.config.rotate_labels => should_rotate_labels_tuned(
                &category_points(spec),
                width,
                self.config.heuristics,
            ),
            _ => LabelRotation::None,
        };

        debug!(
            variant = %spec.variant,
            ?orientation,
            ?label_rotation,
            rects = placed.rects.len(),
            categories = placed.categories.len(),
            "chart layout"
        );
        Ok(ChartGeometry {
            variant: spec.variant,
            viewport,
            orientation,
            label_rotation,
            categories: placed.categories,
            value_domain: placed.value_scale.domain(),
            value_ticks: placed.value_scale.ticks(VALUE_AXIS_TICK_COUNT),
            rects: placed.rects,
            totals: placed.totals,
        })
    }
}

struct Placed {
    categories: Vec<String>,
    value_scale: ValueScale,
    rects: Vec<PlacedRect>,
    totals: Option<IndexMap<String, f64>>,
}

/// One point per category, used for label and count heuristics.
///
/// Multi-series data is reduced to the first point seen for each category,
/// so the heuristics react to the categorical axis rather than mark count.
fn category_points(spec: &ChartVariantSpec) -> Vec<DataPoint> {
    match spec.variant {
        ChartVariant::Simple => spec.data.points(),
        ChartVariant::Grouped | ChartVariant::Stacked => {
            let series = spec.data.series();
            let mut seen = IndexSet::new();
            series
                .iter()
                .flat_map(|series: &Series| series.data.iter())
                .filter(|point| seen.insert(point.key()))
                .cloned()
                .collect()
        }
    }
}
