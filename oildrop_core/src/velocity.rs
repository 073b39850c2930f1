//! Fall and rise velocities from the segmented series.
//!
//! Segments are grouped by [`crate::series::Segment::is_fall`] and `is_rise`; the
//! series uses image coordinates (y grows downward), so a positive slope is
//! the fall phase. Rise velocity is reported as a magnitude.

use crate::charge::PhysicalConstants;
use crate::error::AnalysisError;
use crate::series::{ExtremumPoint, merge_points, segments};
use crate::util::{median, mm_to_m, px_per_frame_to_mm_per_s};

/// Median segment velocities of one droplet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocities {
    /// Rise speed (mm/s, unsigned); 0 when no rising segment was found.
    pub rise_mm_s: f64,
    /// Fall speed (mm/s); 0 when no falling segment was found.
    pub fall_mm_s: f64,
    /// Median negative slope in pixels/frame (signed, <= 0).
    pub rise_slope_px_per_frame: f64,
    /// Median positive slope in pixels/frame.
    pub fall_slope_px_per_frame: f64,
    pub rise_segments: usize,
    pub fall_segments: usize,
}

impl Velocities {
    pub fn rise_m_s(&self) -> f64 {
        mm_to_m(self.rise_mm_s)
    }

    pub fn fall_m_s(&self) -> f64 {
        mm_to_m(self.fall_mm_s)
    }

    /// `(rise, fall)` in mm/s.
    pub fn as_mm_s(&self) -> (f64, f64) {
        (self.rise_mm_s, self.fall_mm_s)
    }
}

/// Converts per-segment slopes into physical velocities for one camera setup.
#[derive(Debug, Clone, Copy)]
pub struct VelocityEstimator {
    fps: f64,
    calibration_px_per_mm: f64,
}

impl VelocityEstimator {
    pub fn new(fps: f64, calibration_px_per_mm: f64) -> Result<Self, AnalysisError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(AnalysisError::InvalidConstants(format!(
                "fps must be finite and > 0, got {fps}"
            )));
        }
        if !(calibration_px_per_mm.is_finite() && calibration_px_per_mm > 0.0) {
            return Err(AnalysisError::InvalidConstants(format!(
                "calibration_px_per_mm must be finite and > 0, got {calibration_px_per_mm}"
            )));
        }
        Ok(Self {
            fps,
            calibration_px_per_mm,
        })
    }

    pub fn from_constants(c: &PhysicalConstants) -> Result<Self, AnalysisError> {
        Self::new(c.fps, c.calibration_px_per_mm)
    }

    pub fn estimate(
        &self,
        peaks: &[ExtremumPoint],
        troughs: &[ExtremumPoint],
    ) -> Result<Velocities, AnalysisError> {
        let points = merge_points(peaks, troughs);
        if points.len() < 2 {
            return Err(AnalysisError::NoSegments {
                points: points.len(),
            });
        }

        let mut falling = Vec::new();
        let mut rising = Vec::new();
        for seg in segments(&points) {
            match seg.slope() {
                None => {
                    tracing::warn!(
                        index = seg.start.index,
                        "vertical segment between extrema at the same frame; skipped"
                    );
                }
                Some(s) if seg.is_fall() => falling.push(s),
                Some(s) if seg.is_rise() => rising.push(s),
                Some(s) => {
                    tracing::trace!(
                        from = seg.start.index,
                        to = seg.end.index,
                        slope = s,
                        "flat segment discarded"
                    );
                }
            }
        }
        tracing::trace!(?falling, ?rising, "segment slopes (px/frame)");

        let fall_slope = median(&falling).unwrap_or(0.0);
        let rise_slope = median(&rising).unwrap_or(0.0);
        let fall_mm_s = px_per_frame_to_mm_per_s(fall_slope, self.fps, self.calibration_px_per_mm);
        let rise_mm_s =
            px_per_frame_to_mm_per_s(rise_slope, self.fps, self.calibration_px_per_mm).abs();
        tracing::debug!(
            fall_slope,
            rise_slope,
            fall_mm_s,
            rise_mm_s,
            fall_segments = falling.len(),
            rise_segments = rising.len(),
            "median velocities"
        );

        Ok(Velocities {
            rise_mm_s,
            fall_mm_s,
            rise_slope_px_per_frame: rise_slope,
            fall_slope_px_per_frame: fall_slope,
            rise_segments: rising.len(),
            fall_segments: falling.len(),
        })
    }
}

/// Median fall/rise velocities from peaks and troughs, converted with the
/// given frame rate and calibration.
pub fn estimate_velocities(
    peaks: &[ExtremumPoint],
    troughs: &[ExtremumPoint],
    fps: f64,
    calibration_px_per_mm: f64,
) -> Result<Velocities, AnalysisError> {
    VelocityEstimator::new(fps, calibration_px_per_mm)?.estimate(peaks, troughs)
}
