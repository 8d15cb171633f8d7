//! Continuous scales mapping data values onto pixel ranges.

use chrono::{DateTime, Utc};

use crate::model::Record;
use crate::projection::{max_magnitude, time_extent};

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Linear map from `domain` to `range`.
///
/// A degenerate domain (both ends equal) maps everything to the middle of
/// the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        r0 + (r1 - r0) * t
    }

    /// Roughly `count` evenly spaced round values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = self.domain;
        ticks(lo.min(hi), lo.max(hi), count)
    }
}

/// Linear map from instants to a pixel range, computed in epoch
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (DateTime<Utc>, DateTime<Utc>),
    inner: LinearScale,
}

impl TimeScale {
    pub fn new(domain: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> Self {
        let inner = LinearScale::new(
            (
                domain.0.timestamp_millis() as f64,
                domain.1.timestamp_millis() as f64,
            ),
            range,
        );
        Self { domain, inner }
    }

    pub fn domain(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.inner.range()
    }

    pub fn map(&self, t: DateTime<Utc>) -> f64 {
        self.inner.map(t.timestamp_millis() as f64)
    }
}

/// Both axis scales of one render.
///
/// Rebuilt from scratch on every render; `x` is `None` when nothing is
/// plotted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    pub x: Option<TimeScale>,
    pub y: LinearScale,
}

impl ScaleState {
    /// Fit scales to a filtered, sorted record set: x spans the date extent,
    /// y spans `0..=max distance`.
    pub fn fit(records: &[&Record], graph_width: f64, graph_height: f64) -> Self {
        Self {
            x: time_extent(records).map(|extent| TimeScale::new(extent, (0.0, graph_width))),
            y: LinearScale::new((0.0, max_magnitude(records)), (graph_height, 0.0)),
        }
    }
}

/// Round-number ticks covering `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let Some((i1, i2, inc)) = tick_spec(start, stop, count as f64) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }
    (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect()
}

/// Step between round ticks for `count` ticks over `[start, stop]`.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    match tick_spec(start.min(stop), start.max(stop), count as f64) {
        Some((_, _, inc)) if inc < 0.0 => 1.0 / -inc,
        Some((_, _, inc)) => inc,
        None => 0.0,
    }
}

/// Returns `(first index, last index, increment)`. A negative increment
/// means "divide by `-inc`", which keeps fractional ticks exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let n = 10f64.powf(-power) / factor;
        i1 = (start * n).round() as i64;
        i2 = (stop * n).round() as i64;
        if (i1 as f64) / n < start {
            i1 += 1;
        }
        if (i2 as f64) / n > stop {
            i2 -= 1;
        }
        inc = -n;
    } else {
        let n = 10f64.powf(power) * factor;
        i1 = (start / n).round() as i64;
        i2 = (stop / n).round() as i64;
        if (i1 as f64) * n < start {
            i1 += 1;
        }
        if (i2 as f64) * n > stop {
            i2 -= 1;
        }
        inc = n;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::parse_date;

    #[test]
    fn linear_maps_inverted_range() {
        let y = LinearScale::new((0.0, 5.0), (410.0, 0.0));
        assert_eq!(y.map(0.0), 410.0);
        assert_eq!(y.map(5.0), 0.0);
        assert_eq!(y.map(2.5), 205.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_midpoint() {
        let y = LinearScale::new((0.0, 0.0), (410.0, 0.0));
        assert_eq!(y.map(0.0), 205.0);

        let day = parse_date("2024-01-01").unwrap();
        let x = TimeScale::new((day, day), (0.0, 280.0));
        assert_eq!(x.map(day), 140.0);
    }

    #[test]
    fn time_scale_is_linear_in_time() {
        let x = TimeScale::new(
            (
                parse_date("2024-01-01").unwrap(),
                parse_date("2024-01-03").unwrap(),
            ),
            (0.0, 280.0),
        );
        assert_eq!(x.map(parse_date("2024-01-02").unwrap()), 140.0);
    }

    #[test]
    fn ticks_pick_round_values() {
        assert_eq!(ticks(0.0, 5.0, 4), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(ticks(0.0, 8.0, 4), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(ticks(0.0, 100.0, 4), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(ticks(0.0, 1.0, 4), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(ticks(3.0, 3.0, 4), vec![3.0]);
        assert!(ticks(0.0, 5.0, 0).is_empty());
    }

    #[test]
    fn tick_step_matches_ticks() {
        assert_eq!(tick_step(0.0, 8.0, 4), 2.0);
        assert_eq!(tick_step(0.0, 1.0, 4), 0.2);
    }
}
