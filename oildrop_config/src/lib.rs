#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and position-series file formats for the oil-drop analysis.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - `annotation` reads and writes the per-frame annotation records and the
//!   plain `frame,y_center` CSV that feed the core as a position series.
use serde::Deserialize;

pub mod annotation;

pub use annotation::{
    AnnotationDirSource, AnnotationRecord, SeriesCsvSource, SeriesRow, load_annotation_dir,
    load_series_csv, write_annotation, write_series_csv,
};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Apparatus {
    /// Potential applied across the plates (V).
    pub voltage_v: f64,
    /// Plate separation in millimeters; converted to meters by the core.
    pub plate_separation_mm: f64,
}

impl Default for Apparatus {
    fn default() -> Self {
        Self {
            voltage_v: 500.0,
            plate_separation_mm: 4.902,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Oil {
    pub density_kg_m3: f64,
}

impl Default for Oil {
    fn default() -> Self {
        Self {
            density_kg_m3: 861.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Environment {
    pub gravity_m_s2: f64,
    pub temperature_c: f64,
    /// Ambient pressure; also accepts alias "pressure".
    #[serde(alias = "pressure")]
    pub pressure_torr: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity_m_s2: 9.81,
            temperature_c: 20.0,
            pressure_torr: 760.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Camera {
    pub fps: f64,
    /// Pixels per millimeter at the focal plane
    pub calibration_px_per_mm: f64,
    /// Height used to scale normalized y-centers into pixels
    pub frame_height_px: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fps: 30.0,
            calibration_px_per_mm: 414.20,
            frame_height_px: 512.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Segmentation {
    /// Minimum number of frames between two extrema of the same kind
    pub min_separation: usize,
    /// Minimum prominence in pixels
    pub min_prominence: f64,
}

impl Default for Segmentation {
    fn default() -> Self {
        Self {
            min_separation: 100,
            min_prominence: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub apparatus: Apparatus,
    #[serde(default)]
    pub oil: Oil,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default)]
    pub segmentation: Segmentation,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_config_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn ensure_positive(name: &str, v: f64) -> eyre::Result<()> {
    if !v.is_finite() {
        eyre::bail!("{name} must be finite");
    }
    if v <= 0.0 {
        eyre::bail!("{name} must be > 0");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Apparatus
        if !self.apparatus.voltage_v.is_finite() || self.apparatus.voltage_v == 0.0 {
            eyre::bail!("apparatus.voltage_v must be finite and non-zero");
        }
        ensure_positive(
            "apparatus.plate_separation_mm",
            self.apparatus.plate_separation_mm,
        )?;

        // Oil
        ensure_positive("oil.density_kg_m3", self.oil.density_kg_m3)?;

        // Environment
        ensure_positive("environment.gravity_m_s2", self.environment.gravity_m_s2)?;
        ensure_positive("environment.pressure_torr", self.environment.pressure_torr)?;
        let t = self.environment.temperature_c;
        if !t.is_finite() || !(-50.0..=100.0).contains(&t) {
            eyre::bail!("environment.temperature_c must be in [-50, 100]");
        }

        // Camera
        ensure_positive("camera.fps", self.camera.fps)?;
        ensure_positive(
            "camera.calibration_px_per_mm",
            self.camera.calibration_px_per_mm,
        )?;
        ensure_positive("camera.frame_height_px", self.camera.frame_height_px)?;

        // Segmentation
        let p = self.segmentation.min_prominence;
        if !p.is_finite() || p < 0.0 {
            eyre::bail!("segmentation.min_prominence must be >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}
