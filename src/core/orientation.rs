use std::f64::consts::FRAC_1_SQRT_2;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{DataPoint, Dimensions, Orientation};
use crate::error::{ChartError, ChartResult};

/// Presentation tuning for orientation and sizing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutHeuristics {
    /// Estimated pixel width of one label character.
    pub label_char_width_px: f64,
    /// Above this many points the layout turns horizontal.
    pub horizontal_point_threshold: usize,
    /// Above this width/height ratio the layout turns horizontal.
    pub aspect_ratio_threshold: f64,
    pub default_width: f64,
    pub default_height: f64,
    pub horizontal_min_height: f64,
    pub horizontal_px_per_item: f64,
    pub horizontal_max_height: f64,
    pub vertical_min_width: f64,
    pub vertical_px_per_item: f64,
    pub vertical_max_width: f64,
    /// Fixed allowance added to per-item sizing for axes and margins.
    pub axis_allowance_px: f64,
}

impl Default for LayoutHeuristics {
    fn default() -> Self {
        Self {
            label_char_width_px: 8.0,
            horizontal_point_threshold: 15,
            aspect_ratio_threshold: 2.0,
            default_width: 400.0,
            default_height: 300.0,
            horizontal_min_height: 300.0,
            horizontal_px_per_item: 30.0,
            horizontal_max_height: 800.0,
            vertical_min_width: 400.0,
            vertical_px_per_item: 50.0,
            vertical_max_width: 1200.0,
            axis_allowance_px: 100.0,
        }
    }
}

impl LayoutHeuristics {
    pub fn validate(self) -> ChartResult<Self> {
        for (value, name) in [
            (self.label_char_width_px, "label_char_width_px"),
            (self.aspect_ratio_threshold, "aspect_ratio_threshold"),
            (self.default_width, "default_width"),
            (self.default_height, "default_height"),
            (self.horizontal_min_height, "horizontal_min_height"),
            (self.horizontal_px_per_item, "horizontal_px_per_item"),
            (self.horizontal_max_height, "horizontal_max_height"),
            (self.vertical_min_width, "vertical_min_width"),
            (self.vertical_px_per_item, "vertical_px_per_item"),
            (self.vertical_max_width, "vertical_max_width"),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "heuristics `{name}` must be finite and > 0"
                )));
            }
        }
        if !self.axis_allowance_px.is_finite() || self.axis_allowance_px < 0.0 {
            return Err(ChartError::InvalidConfig(
                "heuristics `axis_allowance_px` must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }

    fn estimated_label_width(self, data: &[DataPoint]) -> f64 {
        average_label_chars(data) * self.label_char_width_px
    }
}

/// Tick label rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LabelRotation {
    #[default]
    None,
    Diagonal,
    Vertical,
}

impl LabelRotation {
    #[must_use]
    pub fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Diagonal => 45,
            Self::Vertical => 90,
        }
    }
}

fn average_label_chars(data: &[DataPoint]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let total: usize = data
        .iter()
        .map(|point| point.display_label().chars().count())
        .sum();
    total as f64 / data.len() as f64
}

fn per_item_width(available: f64, count: usize) -> f64 {
    available / count.max(1) as f64
}

pub fn get_optimal_orientation(data: &[DataPoint], width: f64, height: f64) -> Orientation {
    get_optimal_orientation_tuned(data, width, height, LayoutHeuristics::default())
}

/// Picks horizontal bars when labels would not fit under columns, when there
/// are too many points, or when the container is very wide.
pub fn get_optimal_orientation_tuned(
    data: &[DataPoint],
    width: f64,
    height: f64,
    heuristics: LayoutHeuristics,
) -> Orientation {
    let label_width = heuristics.estimated_label_width(data);
    let labels_overflow = label_width > per_item_width(width, data.len());
    let too_many_points = data.len() > heuristics.horizontal_point_threshold;
    let wide = height > 0.0 && width / height > heuristics.aspect_ratio_threshold;

    let orientation = if labels_overflow || too_many_points || wide {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    };
    trace!(
        points = data.len(),
        label_width,
        labels_overflow,
        too_many_points,
        wide,
        ?orientation,
        "optimal orientation"
    );
    orientation
}

pub fn should_rotate_labels(data: &[DataPoint], available_width: f64) -> LabelRotation {
    should_rotate_labels_tuned(data, available_width, LayoutHeuristics::default())
}

/// Keeps labels flat when they fit, else tries 45°, else 90°.
pub fn should_rotate_labels_tuned(
    data: &[DataPoint],
    available_width: f64,
    heuristics: LayoutHeuristics,
) -> LabelRotation {
    let label_width = heuristics.estimated_label_width(data);
    let per_item = per_item_width(available_width, data.len());
    if label_width <= per_item {
        LabelRotation::None
    } else if label_width * FRAC_1_SQRT_2 <= per_item {
        LabelRotation::Diagonal
    } else {
        LabelRotation::Vertical
    }
}

pub fn get_recommended_dimensions(
    data: &[DataPoint],
    orientation: Orientation,
    width: Option<f64>,
    height: Option<f64>,
) -> Dimensions {
    get_recommended_dimensions_tuned(
        data,
        orientation,
        width,
        height,
        LayoutHeuristics::default(),
    )
}

/// Grows the categorical axis with the point count, within fixed bounds.
///
/// The other axis keeps the caller's size or the heuristics default.
pub fn get_recommended_dimensions_tuned(
    data: &[DataPoint],
    orientation: Orientation,
    width: Option<f64>,
    height: Option<f64>,
    heuristics: LayoutHeuristics,
) -> Dimensions {
    let n = data.len() as f64;
    match orientation {
        Orientation::Horizontal => Dimensions {
            width: width.unwrap_or(heuristics.default_width),
            height: (n * heuristics.horizontal_px_per_item + heuristics.axis_allowance_px)
                .max(heuristics.horizontal_min_height)
                .min(heuristics.horizontal_max_height),
        },
        Orientation::Vertical => Dimensions {
            width: (n * heuristics.vertical_px_per_item + heuristics.axis_allowance_px)
                .max(heuristics.vertical_min_width)
                .min(heuristics.vertical_max_width),
            height: height.unwrap_or(heuristics.default_height),
        },
    }
}
