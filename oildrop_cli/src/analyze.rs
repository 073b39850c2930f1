//! Command bodies: config mapping, source assembly, and result output.

use std::path::Path;

use eyre::Result;
use oildrop_config::{AnnotationDirSource, Config, SeriesCsvSource};
use oildrop_core::util::mm_to_m;
use oildrop_core::{
    Analyzer, BatchJob, ChargeEstimate, Extrema, PhysicalConstants, PositionSeries,
    SegmentationParams, Velocities, analyze_batch, estimate_charge,
};
use oildrop_traits::PositionSource;
use serde_json::json;

use crate::cli::{InputArgs, SegmentationOverrides};

fn build_analyzer(cfg: &Config, overrides: &SegmentationOverrides) -> Result<Analyzer> {
    let mut params = SegmentationParams::from(&cfg.segmentation);
    if let Some(sep) = overrides.min_separation {
        params.min_separation = sep;
    }
    if let Some(prom) = overrides.min_prominence {
        params.min_prominence = prom;
    }
    Analyzer::builder()
        .with_constants(PhysicalConstants::from(cfg))
        .with_segmentation(params)
        .try_build()
}

fn load_series(cfg: &Config, input: &InputArgs, pixels: bool) -> Result<(String, PositionSeries)> {
    let (label, mut source): (String, Box<dyn PositionSource>) =
        match (&input.annotations, &input.series) {
            (Some(dir), _) => (
                dir.display().to_string(),
                Box::new(AnnotationDirSource::new(dir, cfg.camera.frame_height_px)) as Box<dyn PositionSource>,
            ),
            (None, Some(path)) => {
                let scale = if pixels { 1.0 } else { cfg.camera.frame_height_px };
                (
                    path.display().to_string(),
                    Box::new(SeriesCsvSource::new(path, scale)) as Box<dyn PositionSource>,
                )
            }
            (None, None) => eyre::bail!("either --annotations or --series is required"),
        };
    let values = source.positions().map_err(|e| eyre::eyre!("{e}"))?;
    Ok((label, PositionSeries::new(values)))
}

fn indices(points: &[oildrop_core::ExtremumPoint]) -> Vec<usize> {
    points.iter().map(|p| p.index).collect()
}

fn analysis_json(
    label: &str,
    samples: usize,
    extrema: &Extrema,
    v: &Velocities,
    q: &ChargeEstimate,
) -> serde_json::Value {
    json!({
        "source": label,
        "samples": samples,
        "peaks": indices(&extrema.peaks),
        "troughs": indices(&extrema.troughs),
        "fall_mm_s": v.fall_mm_s,
        "rise_mm_s": v.rise_mm_s,
        "fall_segments": v.fall_segments,
        "rise_segments": v.rise_segments,
        "charge_c": q.charge_coulombs,
        "interval": q.interval,
        "radius_m": q.radius_m,
        "mass_kg": q.mass_kg,
        "viscosity_pa_s": q.viscosity_pa_s,
    })
}

fn print_charge(q: &ChargeEstimate) {
    println!("Charge: {:.5e} C", q.charge_coulombs);
    println!("Interval: {:.2} e", q.interval);
}

pub fn run_analyze(
    cfg: &Config,
    input: &InputArgs,
    overrides: &SegmentationOverrides,
    json_out: bool,
) -> Result<()> {
    let analyzer = build_analyzer(cfg, overrides)?;
    let (label, series) = load_series(cfg, input, overrides.pixels)?;
    tracing::info!(source = %label, samples = series.len(), "analysis start");

    // Stage by stage so text output shows how far the pipeline got
    let extrema = analyzer.segment(&series)?;
    if !json_out {
        println!("Source: {label} ({} frames)", series.len());
        println!(
            "Peaks: {}  Troughs: {}",
            extrema.peaks.len(),
            extrema.troughs.len()
        );
    }
    let v = analyzer.velocities(&extrema)?;
    if !json_out {
        println!(
            "Fall velocity: {:.5} mm/s ({} segments)",
            v.fall_mm_s, v.fall_segments
        );
        println!(
            "Rise velocity: {:.5} mm/s ({} segments)",
            v.rise_mm_s, v.rise_segments
        );
    }
    let q = analyzer.charge(&v)?;
    tracing::info!(charge_c = q.charge_coulombs, interval = q.interval, "analysis complete");

    if json_out {
        println!("{}", analysis_json(&label, series.len(), &extrema, &v, &q));
    } else {
        print_charge(&q);
    }
    Ok(())
}

pub fn run_charge(cfg: &Config, v_rise_mm_s: f64, v_fall_mm_s: f64, json_out: bool) -> Result<()> {
    let constants = PhysicalConstants::from(cfg);
    let q = estimate_charge(mm_to_m(v_rise_mm_s), mm_to_m(v_fall_mm_s), &constants)?;
    if json_out {
        println!(
            "{}",
            json!({
                "rise_mm_s": v_rise_mm_s,
                "fall_mm_s": v_fall_mm_s,
                "charge_c": q.charge_coulombs,
                "interval": q.interval,
                "radius_m": q.radius_m,
                "mass_kg": q.mass_kg,
                "viscosity_pa_s": q.viscosity_pa_s,
            })
        );
    } else {
        print_charge(&q);
    }
    Ok(())
}

pub fn run_batch(
    cfg: &Config,
    dirs: &[std::path::PathBuf],
    workers: Option<usize>,
    overrides: &SegmentationOverrides,
    json_out: bool,
) -> Result<()> {
    let analyzer = build_analyzer(cfg, overrides)?;
    let workers = workers
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1);

    // Load failures are reported per directory and do not stop the batch
    let mut failures = 0usize;
    let mut jobs = Vec::with_capacity(dirs.len());
    let mut lens = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let label = dir.display().to_string();
        match AnnotationDirSource::new(dir, cfg.camera.frame_height_px).positions() {
            Ok(values) => {
                lens.push(values.len());
                jobs.push(BatchJob::new(label, values));
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(dir = %label, error = %e, "failed to load annotations");
                report_batch_error(&label, &e.to_string(), json_out);
            }
        }
    }

    tracing::info!(jobs = jobs.len(), workers, "batch start");
    // Outcomes come back in job order
    for (outcome, samples) in analyze_batch(&analyzer, jobs, workers).into_iter().zip(lens) {
        match &outcome.result {
            Ok(a) => {
                if json_out {
                    println!(
                        "{}",
                        analysis_json(&outcome.label, samples, &a.extrema, &a.velocities, &a.charge)
                    );
                } else {
                    println!(
                        "{}: charge {:.5e} C, interval {:.2} e",
                        outcome.label, a.charge.charge_coulombs, a.charge.interval
                    );
                }
            }
            Err(e) => {
                failures += 1;
                report_batch_error(&outcome.label, &e.to_string(), json_out);
            }
        }
    }

    if failures > 0 {
        eyre::bail!("{failures} of {} droplets failed", dirs.len());
    }
    Ok(())
}

fn report_batch_error(label: &str, msg: &str, json_out: bool) {
    if json_out {
        println!("{}", json!({ "source": label, "error": msg }));
    } else {
        println!("{label}: error: {msg}");
    }
}

pub fn run_check(cfg: &Config, path: Option<&Path>, json_out: bool) -> Result<()> {
    let c = PhysicalConstants::from(cfg);
    c.validate()?;
    let seg = SegmentationParams::from(&cfg.segmentation);
    let origin = path.map_or_else(|| "built-in defaults".to_string(), |p| p.display().to_string());
    if json_out {
        println!(
            "{}",
            json!({
                "config": origin,
                "voltage_v": c.voltage_v,
                "plate_separation_m": c.plate_separation_m,
                "oil_density_kg_m3": c.oil_density_kg_m3,
                "gravity_m_s2": c.gravity_m_s2,
                "temperature_c": c.temperature_c,
                "pressure_torr": c.pressure_torr,
                "calibration_px_per_mm": c.calibration_px_per_mm,
                "fps": c.fps,
                "frame_height_px": cfg.camera.frame_height_px,
                "min_separation": seg.min_separation,
                "min_prominence": seg.min_prominence,
            })
        );
    } else {
        println!("Config: {origin}");
        println!("Field: {:.1} V over {:.3} mm", c.voltage_v, c.plate_separation_m * 1e3);
        println!("Oil density: {} kg/m^3", c.oil_density_kg_m3);
        println!(
            "Environment: g={} m/s^2, T={} C, p={} torr",
            c.gravity_m_s2, c.temperature_c, c.pressure_torr
        );
        println!(
            "Camera: {} fps, {} px/mm, frame height {} px",
            c.fps, c.calibration_px_per_mm, cfg.camera.frame_height_px
        );
        println!(
            "Segmentation: min_separation={} frames, min_prominence={} px",
            seg.min_separation, seg.min_prominence
        );
        println!("Config OK");
    }
    Ok(())
}
