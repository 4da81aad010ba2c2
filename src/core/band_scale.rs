use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Discrete band scale for categorical axes.
///
/// Keys are deduplicated in first-seen order. Every band has the same width;
/// the inner padding is a fraction of one step and each outer edge receives
/// half of it, so `n` bands exactly fill the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    keys: IndexSet<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    step: f64,
    bandwidth: f64,
    start: f64,
}

impl BandScale {
    /// Creates a scale over `keys` with inner padding `padding` and outer
    /// padding `padding / 2`.
    pub fn new<I, K>(keys: I, range: (f64, f64), padding: f64) -> ChartResult<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::with_paddings(keys, range, padding, padding * 0.5)
    }

    /// Creates a scale with explicit inner and outer padding fractions.
    pub fn with_paddings<I, K>(
        keys: I,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> ChartResult<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "band scale range must be finite".to_owned(),
            ));
        }
        if !padding_inner.is_finite() || !(0.0..1.0).contains(&padding_inner) {
            return Err(ChartError::InvalidData(
                "band scale inner padding must be within [0, 1)".to_owned(),
            ));
        }
        if !padding_outer.is_finite() || padding_outer < 0.0 {
            return Err(ChartError::InvalidData(
                "band scale outer padding must be finite and >= 0".to_owned(),
            ));
        }

        let mut scale = Self {
            keys: keys.into_iter().map(Into::into).collect(),
            range,
            padding_inner,
            padding_outer,
            align: 0.5,
            step: 0.0,
            bandwidth: 0.0,
            start: 0.0,
        };
        scale.rescale();
        Ok(scale)
    }

    fn rescale(&mut self) {
        let n = self.keys.len() as f64;
        let (lo, hi) = self.ordered_range();
        let extent = hi - lo;
        let space = n - self.padding_inner + 2.0 * self.padding_outer;
        self.step = extent / space.max(1.0);
        self.start = lo + (extent - self.step * (n - self.padding_inner)) * self.align;
        self.bandwidth = self.step * (1.0 - self.padding_inner);
    }

    fn ordered_range(&self) -> (f64, f64) {
        let (r0, r1) = self.range;
        if r1 < r0 { (r1, r0) } else { (r0, r1) }
    }

    fn is_reversed(&self) -> bool {
        self.range.1 < self.range.0
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Distance between the starts of adjacent bands.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn padding_inner(&self) -> f64 {
        self.padding_inner
    }

    #[must_use]
    pub fn padding_outer(&self) -> f64 {
        self.padding_outer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn position_of_index(&self, index: usize) -> f64 {
        let slot = if self.is_reversed() {
            self.keys.len() - 1 - index
        } else {
            index
        };
        self.start + self.step * slot as f64
    }

    /// Start offset of the band for `key`.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<f64> {
        self.keys
            .get_index_of(key)
            .map(|index| self.position_of_index(index))
    }

    /// Like [`position`](Self::position) but unknown keys are an error.
    pub fn try_position(&self, key: &str) -> ChartResult<f64> {
        self.position(key)
            .ok_or_else(|| ChartError::UnknownCategory {
                category: key.to_owned(),
            })
    }

    /// Center of the band for `key`.
    #[must_use]
    pub fn center(&self, key: &str) -> Option<f64> {
        self.position(key)
            .map(|position| position + self.bandwidth * 0.5)
    }

    /// Key whose band contains `pixel`; padding gaps map to `None`.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> Option<&str> {
        if !pixel.is_finite() || self.keys.is_empty() || self.step <= 0.0 {
            return None;
        }
        let offset = pixel - self.start;
        if offset < 0.0 {
            return None;
        }
        let slot = (offset / self.step).floor() as usize;
        if slot >= self.keys.len() || offset - slot as f64 * self.step > self.bandwidth {
            return None;
        }
        let index = if self.is_reversed() {
            self.keys.len() - 1 - slot
        } else {
            slot
        };
        self.keys.get_index(index).map(String::as_str)
    }
}
