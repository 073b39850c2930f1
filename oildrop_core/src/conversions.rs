//! `From` implementations bridging `oildrop_config` types to `oildrop_core` types.

use crate::charge::PhysicalConstants;
use crate::extrema::SegmentationParams;
use crate::util::mm_to_m;

// ── PhysicalConstants ────────────────────────────────────────────────────────

impl From<&oildrop_config::Config> for PhysicalConstants {
    fn from(c: &oildrop_config::Config) -> Self {
        Self {
            voltage_v: c.apparatus.voltage_v,
            plate_separation_m: mm_to_m(c.apparatus.plate_separation_mm),
            oil_density_kg_m3: c.oil.density_kg_m3,
            gravity_m_s2: c.environment.gravity_m_s2,
            temperature_c: c.environment.temperature_c,
            pressure_torr: c.environment.pressure_torr,
            calibration_px_per_mm: c.camera.calibration_px_per_mm,
            fps: c.camera.fps,
        }
    }
}

// ── SegmentationParams ───────────────────────────────────────────────────────

impl From<&oildrop_config::Segmentation> for SegmentationParams {
    fn from(c: &oildrop_config::Segmentation) -> Self {
        Self {
            min_separation: c.min_separation,
            min_prominence: c.min_prominence,
        }
    }
}
