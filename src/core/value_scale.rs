use serde::{Deserialize, Serialize};

use crate::core::ValueRange;
use crate::core::layout::value_domain;
use crate::error::{ChartError, ChartResult};

/// Tick count used when niceing a domain.
pub const DEFAULT_NICE_TICK_COUNT: usize = 10;

/// Linear mapping from a numeric domain to a pixel range.
///
/// The range may be inverted (`(height, 0)`) so larger values sit higher on
/// a y-down canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ValueScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(ChartError::InvalidData(
                "value scale domain must be finite".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "value scale range must be finite".to_owned(),
            ));
        }
        Ok(Self { domain, range })
    }

    /// Builds the niced `[min(0, data.min), data.max]` scale used by bar layouts.
    pub fn from_data_range(data: ValueRange, range: (f64, f64)) -> ChartResult<Self> {
        Ok(Self::new(value_domain(data), range)?.nice(DEFAULT_NICE_TICK_COUNT))
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    /// Rounds the domain outward to multiples of a nice step.
    ///
    /// Repeats until the step is stable, since widening can change it.
    #[must_use]
    pub fn nice(self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous = None;
        for _ in 0..10 {
            let step = nice_step((stop - start) / count.max(1) as f64);
            if step <= 0.0 || previous == Some(step) {
                break;
            }
            (start, stop) = snap_outward(start, stop, step);
            previous = Some(step);
        }

        let domain = if reversed { (stop, start) } else { (start, stop) };
        Self { domain, ..self }
    }

    /// Maps a domain value to pixels. A zero-width domain maps to the range midpoint.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 {
            0.5
        } else {
            (value - d0) / span
        };
        r0 + t * (r1 - r0)
    }

    /// Maps pixels back to the domain.
    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        if span == 0.0 {
            return d0;
        }
        d0 + (pixel - r0) / span * (d1 - d0)
    }

    /// Evenly spaced nice values covering the domain.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        let (mut lo, mut hi) = self.domain;
        if hi < lo {
            std::mem::swap(&mut lo, &mut hi);
        }
        if count == 0 {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }
        let step = nice_step((hi - lo) / count as f64);
        if step <= 0.0 {
            return vec![lo, hi];
        }
        let (first, last) = snap_inward(lo, hi, step);
        let n = ((last - first) / step).round();
        if !n.is_finite() || n < 0.0 {
            return Vec::new();
        }
        let n = n.min(10_000.0) as usize;
        (0..=n)
            .map(|i| round_to_step(first + step * i as f64, step))
            .collect()
    }
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

// Sub-unit steps snap through their integer inverse to keep edges exact.
fn snap_outward(start: f64, stop: f64, step: f64) -> (f64, f64) {
    if step >= 1.0 {
        ((start / step).floor() * step, (stop / step).ceil() * step)
    } else {
        let inverse = (1.0 / step).round();
        ((start * inverse).floor() / inverse, (stop * inverse).ceil() / inverse)
    }
}

fn snap_inward(start: f64, stop: f64, step: f64) -> (f64, f64) {
    if step >= 1.0 {
        ((start / step).ceil() * step, (stop / step).floor() * step)
    } else {
        let inverse = (1.0 / step).round();
        ((start * inverse).ceil() / inverse, (stop * inverse).floor() / inverse)
    }
}

fn round_to_step(value: f64, step: f64) -> f64 {
    if step >= 1.0 {
        value
    } else {
        let inverse = (1.0 / step).round();
        (value * inverse).round() / inverse
    }
}
