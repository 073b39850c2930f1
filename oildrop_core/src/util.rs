//! Unit conversion and small statistics helpers.

/// Millimeters per meter.
pub const MM_PER_M: f64 = 1_000.0;

/// Convert a slope in pixels/frame to millimeters/second.
#[inline]
pub fn px_per_frame_to_mm_per_s(slope: f64, fps: f64, calibration_px_per_mm: f64) -> f64 {
    slope * fps / calibration_px_per_mm
}

#[inline]
pub fn mm_to_m(mm: f64) -> f64 {
    mm / MM_PER_M
}

/// Median of `values`, averaging the two middle elements for even lengths.
/// Returns `None` when empty or when any element is NaN.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[1.0, f64::NAN]), None);
    }

    #[test]
    fn bench_conversion() {
        // 414.2 px/mm at 30 fps: 13.806667 px/frame is 1 mm/s
        let v = px_per_frame_to_mm_per_s(414.2 / 30.0, 30.0, 414.2);
        assert!((v - 1.0).abs() < 1e-12);
        assert!((mm_to_m(4.902) - 0.004902).abs() < 1e-15);
    }
}
