use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{BandScale, DataPoint, Orientation, Rect, Series, ValueRange, ValueScale};
use crate::error::{ChartError, ChartResult};

/// Pixel extents of a chart area for one orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Geometry {
    width: f64,
    height: f64,
    orientation: Orientation,
}

impl Geometry {
    pub(crate) fn new(width: f64, height: f64, orientation: Orientation) -> ChartResult<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(ChartError::InvalidData(format!(
                "layout size must be finite and > 0, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            orientation,
        })
    }

    pub(crate) fn category_range(self) -> (f64, f64) {
        match self.orientation {
            Orientation::Vertical => (0.0, self.width),
            Orientation::Horizontal => (0.0, self.height),
        }
    }

    /// Vertical value axes are inverted so larger values sit higher.
    pub(crate) fn value_range(self) -> (f64, f64) {
        match self.orientation {
            Orientation::Vertical => (self.height, 0.0),
            Orientation::Horizontal => (0.0, self.width),
        }
    }
}

/// Un-niced value domain `[min(0, data.min), data.max]`.
#[must_use]
pub fn value_domain(data: ValueRange) -> (f64, f64) {
    (data.min.min(0.0), data.max)
}

/// Rectangle spanning `from..to` on the value axis and
/// `category_start..category_start + category_width` on the categorical axis.
pub(crate) fn segment_rect(
    orientation: Orientation,
    category_start: f64,
    category_width: f64,
    value_scale: ValueScale,
    from: f64,
    to: f64,
) -> Rect {
    let a = value_scale.map(from);
    let b = value_scale.map(to);
    let (value_start, value_length) = (a.min(b), (b - a).abs());
    match orientation {
        Orientation::Vertical => {
            Rect::new(category_start, value_start, category_width, value_length)
        }
        Orientation::Horizontal => {
            Rect::new(value_start, category_start, value_length, category_width)
        }
    }
}

/// Rectangle for `point` anchored at the zero baseline.
///
/// Positive values extend up (vertical) or right (horizontal) from zero,
/// negative values the other way.
pub fn get_point_position(
    point: &DataPoint,
    band: &BandScale,
    value_scale: ValueScale,
    orientation: Orientation,
) -> ChartResult<Rect> {
    let start = band.try_position(&point.key())?;
    Ok(segment_rect(
        orientation,
        start,
        band.bandwidth(),
        value_scale,
        0.0,
        point.y,
    ))
}

/// Horizontal bar: categories on y, value length on x.
pub fn get_bar_position(
    point: &DataPoint,
    band: &BandScale,
    value_scale: ValueScale,
) -> ChartResult<Rect> {
    get_point_position(point, band, value_scale, Orientation::Horizontal)
}

/// Vertical column: categories on x, value length on y.
pub fn get_column_position(
    point: &DataPoint,
    band: &BandScale,
    value_scale: ValueScale,
) -> ChartResult<Rect> {
    get_point_position(point, band, value_scale, Orientation::Vertical)
}

/// Scales for a single-series bar or column chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleLayout {
    pub band: BandScale,
    pub value_scale: ValueScale,
    pub orientation: Orientation,
}

/// Band scale over point keys in first-seen order plus a niced value scale.
pub fn calculate_simple_layout(
    points: &[DataPoint],
    width: f64,
    height: f64,
    padding: f64,
    orientation: Orientation,
) -> ChartResult<SimpleLayout> {
    let geometry = Geometry::new(width, height, orientation)?;
    let band = BandScale::new(
        points.iter().map(DataPoint::key),
        geometry.category_range(),
        padding,
    )?;
    let data_range = ValueRange::of(points.iter().map(|point| point.y)).unwrap_or_default();
    let value_scale = ValueScale::from_data_range(data_range, geometry.value_range())?;
    debug!(
        points = points.len(),
        bandwidth = band.bandwidth(),
        ?orientation,
        "simple layout"
    );
    Ok(SimpleLayout {
        band,
        value_scale,
        orientation,
    })
}

impl SimpleLayout {
    pub fn position(&self, point: &DataPoint) -> ChartResult<Rect> {
        get_point_position(point, &self.band, self.value_scale, self.orientation)
    }
}

/// Padding fractions for grouped layouts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupPadding {
    /// Between category groups.
    pub group: f64,
    /// Between series inside one group.
    pub series: f64,
}

impl Default for GroupPadding {
    fn default() -> Self {
        Self {
            group: 0.1,
            series: 0.05,
        }
    }
}

/// Nested band scales for side-by-side series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedLayout {
    /// Over category keys, sorted ascending.
    pub categories: BandScale,
    /// Over series ids, ranged to one category bandwidth.
    pub series: BandScale,
    pub value_scale: ValueScale,
    pub orientation: Orientation,
}

/// Outer band scale over the union of category keys, inner band scale over
/// series ids, and one value scale spanning every series.
pub fn calculate_grouped_layout(
    series: &[Series],
    width: f64,
    height: f64,
    padding: GroupPadding,
    orientation: Orientation,
) -> ChartResult<GroupedLayout> {
    let geometry = Geometry::new(width, height, orientation)?;

    let mut keys: Vec<String> = series
        .iter()
        .flat_map(|series| series.data.iter().map(DataPoint::key))
        .collect();
    keys.sort();
    keys.dedup();

    let categories = BandScale::new(keys, geometry.category_range(), padding.group)?;
    let inner = BandScale::new(
        series.iter().map(|series| series.id.clone()),
        (0.0, categories.bandwidth()),
        padding.series,
    )?;
    let data_range = ValueRange::of(
        series
            .iter()
            .flat_map(|series| series.data.iter().map(|point| point.y)),
    )
    .unwrap_or_default();
    let value_scale = ValueScale::from_data_range(data_range, geometry.value_range())?;

    debug!(
        series = series.len(),
        categories = categories.len(),
        group_bandwidth = categories.bandwidth(),
        series_bandwidth = inner.bandwidth(),
        "grouped layout"
    );
    Ok(GroupedLayout {
        categories,
        series: inner,
        value_scale,
        orientation,
    })
}

impl GroupedLayout {
    /// Rectangle for `point` of `series_id`, offset inside its category group.
    pub fn get_grouped_bar_position(
        &self,
        point: &DataPoint,
        series_id: &str,
    ) -> ChartResult<Rect> {
        let group_start = self.categories.try_position(&point.key())?;
        let series_start = self
            .series
            .position(series_id)
            .ok_or_else(|| ChartError::UnknownSeries {
                series_id: series_id.to_owned(),
            })?;
        Ok(segment_rect(
            self.orientation,
            group_start + series_start,
            self.series.bandwidth(),
            self.value_scale,
            0.0,
            point.y,
        ))
    }
}
