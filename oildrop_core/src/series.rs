//! Value types flowing through the pipeline.

use std::ops::Deref;

/// Vertical-center position per frame, index = frame number.
///
/// Values are in pixels with the image y-axis pointing down, so a falling
/// droplet produces increasing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSeries(Vec<f64>);

impl PositionSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for PositionSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for PositionSeries {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl FromIterator<f64> for PositionSeries {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumKind {
    Peak,
    Trough,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremumPoint {
    pub index: usize,
    pub value: f64,
    pub kind: ExtremumKind,
}

impl ExtremumPoint {
    pub fn peak(index: usize, value: f64) -> Self {
        Self {
            index,
            value,
            kind: ExtremumKind::Peak,
        }
    }

    pub fn trough(index: usize, value: f64) -> Self {
        Self {
            index,
            value,
            kind: ExtremumKind::Trough,
        }
    }
}

/// Peaks and troughs of one series, each sorted by index ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extrema {
    pub peaks: Vec<ExtremumPoint>,
    pub troughs: Vec<ExtremumPoint>,
}

impl Extrema {
    /// Both sets merged into one sequence ordered by index (stable on ties).
    pub fn merged(&self) -> Vec<ExtremumPoint> {
        merge_points(&self.peaks, &self.troughs)
    }

    pub fn len(&self) -> usize {
        self.peaks.len() + self.troughs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty() && self.troughs.is_empty()
    }
}

pub(crate) fn merge_points(peaks: &[ExtremumPoint], troughs: &[ExtremumPoint]) -> Vec<ExtremumPoint> {
    let mut all: Vec<ExtremumPoint> = peaks.iter().chain(troughs).copied().collect();
    // sort_by_key is stable
    all.sort_by_key(|p| p.index);
    all
}

/// Straight line between two consecutive extrema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: ExtremumPoint,
    pub end: ExtremumPoint,
}

impl Segment {
    /// Pixels per frame; `None` for a vertical segment (same frame index).
    pub fn slope(&self) -> Option<f64> {
        if self.end.index == self.start.index {
            return None;
        }
        let dx = self.end.index as f64 - self.start.index as f64;
        Some((self.end.value - self.start.value) / dx)
    }

    /// Positive slope means the y value grows, i.e. the droplet moves down.
    pub fn is_fall(&self) -> bool {
        self.slope().is_some_and(|s| s > 0.0)
    }

    pub fn is_rise(&self) -> bool {
        self.slope().is_some_and(|s| s < 0.0)
    }
}

/// Consecutive pairs of an index-ordered point sequence.
pub fn segments(points: &[ExtremumPoint]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|w| Segment {
            start: w[0],
            end: w[1],
        })
        .collect()
}
