//! Stacking engine.
//!
//! Series are sparse over categories; a missing category stacks as `0`.
//! Categories are the deduplicated union of every series' x keys, sorted
//! ascending by plain string comparison.
//!
//! Orders and offsets follow the d3-shape definitions:
//! - `Ascending` sorts by the sum of each series' raw values; ties keep input
//!   order, and `Descending` is the exact reverse of `Ascending`.
//! - `InsideOut` walks series by descending sum (ties keep input order) and
//!   adds each to whichever side of the stack is currently lighter, the
//!   bottom side winning ties. The two largest series end up adjacent in the
//!   middle.
//! - `Wiggle` is the streamgraph baseline minimizing weighted slope change
//!   between adjacent categories; the first category's baseline is `0`.

use std::cmp::Reverse;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::layout::{Geometry, segment_rect};
use crate::core::{BandScale, Orientation, Rect, Series, ValueRange, ValueScale};
use crate::error::{ChartError, ChartResult};

/// Stack position of series, as indices into the input slice.
pub type StackIndices = SmallVec<[usize; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StackOrder {
    #[default]
    None,
    Ascending,
    Descending,
    InsideOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StackOffset {
    /// Cumulative from `0`.
    #[default]
    None,
    /// Each category rescaled to a total height of `1`.
    Expand,
    /// Positives grow up from `0`, negatives grow down from `0`.
    Diverging,
    /// Each category centered about `0`.
    Silhouette,
    /// Streamgraph minimal-wiggle baseline.
    Wiggle,
}

/// One series' span within one category's stack.
///
/// `baseline` is where the segment starts and `top` where it ends, so a
/// negative value has `top < baseline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSegment {
    pub category: String,
    pub baseline: f64,
    pub top: f64,
    /// Raw, unstacked value.
    pub value: f64,
}

impl StackSegment {
    #[must_use]
    pub fn height(&self) -> f64 {
        self.top - self.baseline
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedLayer {
    pub series_id: String,
    /// Position in the stack, `0` at the baseline.
    pub stack_index: usize,
    /// One segment per category, in sorted category order.
    pub segments: Vec<StackSegment>,
}

impl StackedLayer {
    #[must_use]
    pub fn segment(&self, category: &str) -> Option<&StackSegment> {
        self.segments
            .binary_search_by(|segment| segment.category.as_str().cmp(category))
            .ok()
            .map(|index| &self.segments[index])
    }
}

/// Stacked layers in stack order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackLayout {
    pub categories: Vec<String>,
    pub layers: Vec<StackedLayer>,
    pub order: StackOrder,
    pub offset: StackOffset,
}

impl StackLayout {
    #[must_use]
    pub fn layer(&self, series_id: &str) -> Option<&StackedLayer> {
        self.layers.iter().find(|layer| layer.series_id == series_id)
    }

    /// Segment lookup; an unknown series or category is an id mismatch.
    pub fn segment(&self, series_id: &str, category: &str) -> ChartResult<&StackSegment> {
        let layer = self
            .layer(series_id)
            .ok_or_else(|| ChartError::UnknownSeries {
                series_id: series_id.to_owned(),
            })?;
        layer
            .segment(category)
            .ok_or_else(|| ChartError::UnknownStackSegment {
                series_id: series_id.to_owned(),
                category: category.to_owned(),
            })
    }

    /// Series ids from the baseline upward.
    #[must_use]
    pub fn series_order(&self) -> Vec<&str> {
        self.layers
            .iter()
            .map(|layer| layer.series_id.as_str())
            .collect()
    }

    /// Lowest baseline/top and highest baseline/top over every segment.
    #[must_use]
    pub fn extent(&self) -> ValueRange {
        ValueRange::of(
            self.layers
                .iter()
                .flat_map(|layer| layer.segments.iter())
                .flat_map(|segment| [segment.baseline, segment.top]),
        )
        .unwrap_or_default()
    }
}

/// Union of series x keys, deduplicated and sorted ascending.
#[must_use]
pub fn stack_categories(series: &[Series]) -> Vec<String> {
    let keys: IndexSet<String> = series
        .iter()
        .flat_map(|series| series.data.iter().map(|point| point.key()))
        .collect();
    let mut keys: Vec<String> = keys.into_iter().collect();
    keys.sort();
    keys
}

fn value_matrix(series: &[Series], categories: &[String]) -> Vec<Vec<f64>> {
    series
        .iter()
        .map(|series| {
            let values = series.values_by_key();
            categories
                .iter()
                .map(|category| values.get(category).copied().unwrap_or(0.0))
                .collect()
        })
        .collect()
}

/// Stack order for a `series x category` value matrix.
#[must_use]
pub fn stack_order(values: &[Vec<f64>], order: StackOrder) -> StackIndices {
    let sums: Vec<f64> = values.iter().map(|row| row.iter().sum()).collect();

    match order {
        StackOrder::None => (0..values.len()).collect(),
        StackOrder::Ascending => ascending_by_sum(&sums),
        StackOrder::Descending => ascending_by_sum(&sums).into_iter().rev().collect(),
        StackOrder::InsideOut => {
            let mut by_size: StackIndices = (0..sums.len()).collect();
            by_size.sort_by_key(|&index| Reverse(OrderedFloat(sums[index])));

            let (mut top, mut bottom) = (0.0, 0.0);
            let mut tops = StackIndices::new();
            let mut bottoms = StackIndices::new();
            for index in by_size {
                if top < bottom {
                    top += sums[index];
                    tops.push(index);
                } else {
                    bottom += sums[index];
                    bottoms.push(index);
                }
            }
            bottoms.into_iter().rev().chain(tops).collect()
        }
    }
}

fn ascending_by_sum(sums: &[f64]) -> StackIndices {
    let mut indices: StackIndices = (0..sums.len()).collect();
    indices.sort_by_key(|&index| OrderedFloat(sums[index]));
    indices
}

/// Per-category `(baseline, top)` bounds, indexed by input series.
fn stack_bounds(
    values: &[Vec<f64>],
    order: &[usize],
    offset: StackOffset,
) -> Vec<Vec<(f64, f64)>> {
    let mut bounds: Vec<Vec<(f64, f64)>> = values
        .iter()
        .map(|row| row.iter().map(|&value| (0.0, value)).collect())
        .collect();
    let Some(&first) = order.first() else {
        return bounds;
    };
    let categories = values[first].len();

    match offset {
        StackOffset::None => {}
        StackOffset::Expand => {
            for c in 0..categories {
                let total: f64 = values.iter().map(|row| row[c]).sum();
                if total != 0.0 {
                    for row in &mut bounds {
                        row[c].1 /= total;
                    }
                }
            }
        }
        StackOffset::Diverging => {
            for c in 0..categories {
                let (mut positive, mut negative) = (0.0, 0.0);
                for &s in order {
                    let value = values[s][c];
                    bounds[s][c] = if value >= 0.0 {
                        let segment = (positive, positive + value);
                        positive += value;
                        segment
                    } else {
                        let segment = (negative, negative + value);
                        negative += value;
                        segment
                    };
                }
            }
            return bounds;
        }
        StackOffset::Silhouette => {
            for c in 0..categories {
                let total: f64 = values.iter().map(|row| row[c]).sum();
                let baseline = -total / 2.0;
                bounds[first][c] = (baseline, baseline + values[first][c]);
            }
        }
        StackOffset::Wiggle => {
            let baselines = wiggle_baselines(values, order, categories);
            for (c, baseline) in baselines.into_iter().enumerate() {
                bounds[first][c] = (baseline, baseline + values[first][c]);
            }
        }
    }

    for pair in order.windows(2) {
        let (below, current) = (pair[0], pair[1]);
        for c in 0..categories {
            let baseline = bounds[below][c].1;
            bounds[current][c] = (baseline, baseline + bounds[current][c].1);
        }
    }
    bounds
}

fn wiggle_baselines(values: &[Vec<f64>], order: &[usize], categories: usize) -> Vec<f64> {
    let mut baselines = vec![0.0; categories];
    let mut y = 0.0;
    for c in 1..categories {
        let (mut weight, mut weighted_slope) = (0.0, 0.0);
        let mut below_delta = 0.0;
        for &s in order {
            let current = values[s][c];
            let delta = current - values[s][c - 1];
            let slope = delta / 2.0 + below_delta;
            below_delta += delta;
            weight += current;
            weighted_slope += slope * current;
        }
        baselines[c - 1] = y;
        if weight != 0.0 {
            y -= weighted_slope / weight;
        }
    }
    if let Some(last) = baselines.last_mut() {
        *last = y;
    }
    baselines
}

/// Stacks `series` over their sorted category union.
#[must_use]
pub fn compute_stack(series: &[Series], order: StackOrder, offset: StackOffset) -> StackLayout {
    let categories = stack_categories(series);
    let values = value_matrix(series, &categories);
    let stack_indices = stack_order(&values, order);
    let bounds = stack_bounds(&values, &stack_indices, offset);

    let layers = stack_indices
        .iter()
        .enumerate()
        .map(|(stack_index, &s)| StackedLayer {
            series_id: series[s].id.clone(),
            stack_index,
            segments: categories
                .iter()
                .zip(&bounds[s])
                .zip(&values[s])
                .map(|((category, &(baseline, top)), &value)| StackSegment {
                    category: category.clone(),
                    baseline,
                    top,
                    value,
                })
                .collect(),
        })
        .collect();

    debug!(
        series = series.len(),
        categories = categories.len(),
        ?order,
        ?offset,
        "compute stack"
    );
    StackLayout {
        categories,
        layers,
        order,
        offset,
    }
}

/// Sum of raw, unstacked values per category.
#[must_use]
pub fn calculate_stack_totals(series: &[Series]) -> IndexMap<String, f64> {
    let categories = stack_categories(series);
    let values = value_matrix(series, &categories);
    categories
        .into_iter()
        .enumerate()
        .map(|(c, category)| (category, values.iter().map(|row| row[c]).sum()))
        .collect()
}

/// Options for [`calculate_stacked_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackedLayoutOptions {
    pub padding: f64,
    pub order: StackOrder,
    pub offset: StackOffset,
    pub orientation: Orientation,
}

impl Default for StackedLayoutOptions {
    fn default() -> Self {
        Self {
            padding: 0.1,
            order: StackOrder::None,
            offset: StackOffset::None,
            orientation: Orientation::Vertical,
        }
    }
}

/// Stack plus the scales needed to place its segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedLayout {
    pub stack: StackLayout,
    pub band: BandScale,
    pub value_scale: ValueScale,
    pub orientation: Orientation,
}

/// Stacks `series` and fits a band scale over its categories and a niced
/// value scale over the stack extent.
pub fn calculate_stacked_layout(
    series: &[Series],
    width: f64,
    height: f64,
    options: StackedLayoutOptions,
) -> ChartResult<StackedLayout> {
    let geometry = Geometry::new(width, height, options.orientation)?;
    let stack = compute_stack(series, options.order, options.offset);
    let band = BandScale::new(
        stack.categories.iter().cloned(),
        geometry.category_range(),
        options.padding,
    )?;
    let value_scale = ValueScale::from_data_range(stack.extent(), geometry.value_range())?;
    Ok(StackedLayout {
        stack,
        band,
        value_scale,
        orientation: options.orientation,
    })
}

impl StackedLayout {
    /// Rectangle for one series' segment in one category.
    ///
    /// Unknown series or categories mean the caller's ids disagree with the
    /// stacked data and are reported as errors.
    pub fn get_stacked_bar_position(&self, category: &str, series_id: &str) -> ChartResult<Rect> {
        let segment = self.stack.segment(series_id, category)?;
        self.segment_position(segment)
    }

    /// Rectangle for a segment taken from this layout's own stack.
    pub fn segment_position(&self, segment: &StackSegment) -> ChartResult<Rect> {
        let start = self.band.try_position(&segment.category)?;
        Ok(segment_rect(
            self.orientation,
            start,
            self.band.bandwidth(),
            self.value_scale,
            segment.baseline,
            segment.top,
        ))
    }
}
