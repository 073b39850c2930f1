//! Seams between the charge-estimation core and its collaborators.
//!
//! The core never talks to a tracker, a video decoder or a file directly; it
//! consumes a series of vertical-center positions through [`PositionSource`]
//! and delegates raw peak picking to an [`ExtremaFinder`].

/// Something that can produce the per-frame vertical-center series of a droplet.
///
/// Index `i` of the returned vector is frame `i` (contiguous, starting at 0).
/// Values are in pixels; sources holding normalized coordinates scale them
/// before returning.
pub trait PositionSource {
    fn positions(&mut self) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Raw local-maximum detection with a minimum index separation and prominence.
///
/// Implementations return indices of local maxima in ascending order. Troughs
/// are found by callers running the same finder over the negated series.
pub trait ExtremaFinder: Send + Sync {
    fn find_local_extrema(
        &self,
        values: &[f64],
        min_separation: usize,
        min_prominence: f64,
    ) -> Vec<usize>;
}

impl<F: ExtremaFinder + ?Sized> ExtremaFinder for Box<F> {
    fn find_local_extrema(
        &self,
        values: &[f64],
        min_separation: usize,
        min_prominence: f64,
    ) -> Vec<usize> {
        (**self).find_local_extrema(values, min_separation, min_prominence)
    }
}

impl<F: ExtremaFinder + ?Sized> ExtremaFinder for &F {
    fn find_local_extrema(
        &self,
        values: &[f64],
        min_separation: usize,
        min_prominence: f64,
    ) -> Vec<usize> {
        (**self).find_local_extrema(values, min_separation, min_prominence)
    }
}
