use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::DataPoint;

/// Named, ordered collection of points sharing one visual identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub label: String,
    pub data: Vec<DataPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// `None` is treated as visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl Series {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, data: Vec<DataPoint>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data,
            color: None,
            visible: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    /// `y` by x key in one pass; the first point for a repeated key wins.
    #[must_use]
    pub fn values_by_key(&self) -> IndexMap<String, f64> {
        let mut values = IndexMap::with_capacity(self.data.len());
        for point in &self.data {
            values.entry(point.key()).or_insert(point.y);
        }
        values
    }

    #[must_use]
    pub fn statistics(&self) -> SeriesStatistics {
        SeriesStatistics::from_points(&self.data)
    }
}

/// Summary of a series' `y` values.
///
/// An empty series reports zeros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: usize,
}

impl SeriesStatistics {
    #[must_use]
    pub fn from_points(points: &[DataPoint]) -> Self {
        if points.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                avg: 0.0,
                count: 0,
            };
        }
        let (min, max, sum) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), point| (min.min(point.y), max.max(point.y), sum + point.y),
        );
        Self {
            min,
            max,
            avg: sum / points.len() as f64,
            count: points.len(),
        }
    }
}

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range over `values`, or `None` when empty.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |range, value| {
            Some(match range {
                None => Self::new(value, value),
                Some(Self { min, max }) => Self::new(min.min(value), max.max(value)),
            })
        })
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }
}
