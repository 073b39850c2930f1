//! Segmentation of a position series into alternating fall/rise intervals.
//!
//! Raw extrema come from an [`ExtremaFinder`]; the boundary policy on top of
//! it is fixed: frame 0 is always a trough, and the final frame closes the
//! series with the kind opposite to the last detected extremum.

use crate::error::AnalysisError;
use crate::series::{Extrema, ExtremumPoint, PositionSeries};
use oildrop_traits::ExtremaFinder;

/// Peak picking parameters, in frames and pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationParams {
    /// Minimum index distance between two extrema of the same kind (0 acts as 1).
    pub min_separation: usize,
    /// Minimum prominence an extremum must have to be kept.
    pub min_prominence: f64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            min_separation: 100,
            min_prominence: 100.0,
        }
    }
}

/// Local-maximum finder with distance and prominence filtering.
///
/// 1. Strict interior maxima; a flat top counts once, at its midpoint.
/// 2. Distance: visiting maxima from highest to lowest, each kept maximum
///    removes every other maximum closer than `min_separation` frames.
/// 3. Prominence: height above the higher of the two lowest points reachable
///    on each side before meeting a strictly higher sample or the edge.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProminenceFinder;

impl ExtremaFinder for ProminenceFinder {
    fn find_local_extrema(
        &self,
        values: &[f64],
        min_separation: usize,
        min_prominence: f64,
    ) -> Vec<usize> {
        let maxima = local_maxima(values);
        let spaced = select_by_distance(values, &maxima, min_separation.max(1));
        spaced
            .into_iter()
            .filter(|&p| prominence(values, p) >= min_prominence)
            .collect()
    }
}

fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut out = Vec::new();
    if x.len() < 3 {
        return out;
    }
    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                let right = ahead - 1;
                out.push((i + right) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    out
}

fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    if distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }
    let mut keep = vec![true; peaks.len()];
    let mut by_height: Vec<usize> = (0..peaks.len()).collect();
    by_height.sort_by(|&a, &b| x[peaks[a]].total_cmp(&x[peaks[b]]));

    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }
    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

fn prominence(x: &[f64], peak: usize) -> f64 {
    let top = x[peak];

    let mut left_min = top;
    let mut i = peak;
    loop {
        if x[i] > top {
            break;
        }
        left_min = left_min.min(x[i]);
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = top;
    for &v in &x[peak..] {
        if v > top {
            break;
        }
        right_min = right_min.min(v);
    }

    top - left_min.max(right_min)
}

/// Finder output as strictly increasing indices inside the series.
fn checked_indices(mut raw: Vec<usize>, len: usize) -> Vec<usize> {
    let before = raw.len();
    raw.retain(|&i| i < len);
    if raw.len() < before {
        tracing::warn!(
            dropped = before - raw.len(),
            len,
            "extrema finder returned indices past the end of the series"
        );
    }
    raw.sort_unstable();
    raw.dedup();
    raw
}

/// Detect peaks and troughs of `series` with the default [`ProminenceFinder`].
pub fn find_extrema(
    series: &PositionSeries,
    min_separation: usize,
    min_prominence: f64,
) -> Result<Extrema, AnalysisError> {
    find_extrema_with(&ProminenceFinder, series, min_separation, min_prominence)
}

/// Detect peaks and troughs with any finder, then apply the boundary policy.
pub fn find_extrema_with<F: ExtremaFinder + ?Sized>(
    finder: &F,
    series: &PositionSeries,
    min_separation: usize,
    min_prominence: f64,
) -> Result<Extrema, AnalysisError> {
    let y = series.values();
    if y.len() < 2 {
        return Err(AnalysisError::InsufficientData { len: y.len() });
    }
    // NaN prominence would drop every candidate
    let min_prominence = min_prominence.max(0.0);

    let mut peaks = checked_indices(
        finder.find_local_extrema(y, min_separation, min_prominence),
        y.len(),
    );
    let negated: Vec<f64> = y.iter().map(|v| -v).collect();
    let mut troughs = checked_indices(
        finder.find_local_extrema(&negated, min_separation, min_prominence),
        y.len(),
    );
    tracing::debug!(
        len = y.len(),
        raw_peaks = peaks.len(),
        raw_troughs = troughs.len(),
        "raw extrema"
    );

    // Last detected extremum across both sets, before any forcing
    let last_was_peak = match (peaks.last(), troughs.last()) {
        (Some(p), Some(t)) => Some(p > t),
        (Some(_), None) => Some(true),
        (None, Some(_)) => Some(false),
        (None, None) => None,
    };

    if troughs.first() != Some(&0) {
        troughs.insert(0, 0);
    }

    let last = y.len() - 1;
    match last_was_peak {
        Some(true) => {
            if !troughs.contains(&last) {
                troughs.push(last);
            }
        }
        Some(false) => {
            if !peaks.contains(&last) {
                peaks.push(last);
            }
        }
        None => {}
    }

    let extrema = Extrema {
        peaks: peaks
            .into_iter()
            .map(|i| ExtremumPoint::peak(i, y[i]))
            .collect(),
        troughs: troughs
            .into_iter()
            .map(|i| ExtremumPoint::trough(i, y[i]))
            .collect(),
    };
    tracing::debug!(
        peaks = extrema.peaks.len(),
        troughs = extrema.troughs.len(),
        "extrema after boundary forcing"
    );
    Ok(extrema)
}
