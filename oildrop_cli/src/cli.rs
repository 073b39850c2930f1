//! CLI argument definitions and shared statics.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config path tried when --config is not given.
pub const DEFAULT_CONFIG: &str = "etc/oildrop.toml";

#[derive(Parser, Debug)]
#[command(name = "oildrop", version, about = "Millikan oil-drop charge estimator")]
pub struct Cli {
    /// Path to config TOML (typed). Defaults to etc/oildrop.toml when present,
    /// otherwise built-in bench constants.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Where the position series comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Directory of per-frame annotation files (NNNNNN.txt)
    #[arg(long, value_name = "DIR")]
    pub annotations: Option<PathBuf>,

    /// CSV with headers frame,y_center
    #[arg(long, value_name = "FILE")]
    pub series: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct SegmentationOverrides {
    /// Override segmentation.min_separation (frames)
    #[arg(long, value_name = "FRAMES")]
    pub min_separation: Option<usize>,

    /// Override segmentation.min_prominence (pixels)
    #[arg(long, value_name = "PX")]
    pub min_prominence: Option<f64>,

    /// Series values are already pixels (skip scaling by camera.frame_height_px)
    #[arg(long, action = ArgAction::SetTrue)]
    pub pixels: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate the charge of one droplet from its tracked positions
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        overrides: SegmentationOverrides,
    },
    /// Run only the charge model on known velocities
    Charge {
        /// Rise speed in mm/s
        #[arg(long, value_name = "MM_S", allow_negative_numbers = true)]
        v_rise: f64,
        /// Fall speed in mm/s
        #[arg(long, value_name = "MM_S", allow_negative_numbers = true)]
        v_fall: f64,
    },
    /// Analyze several annotation directories concurrently
    Batch {
        /// Annotation directories, one droplet each
        #[arg(required = true, value_name = "DIR")]
        dirs: Vec<PathBuf>,
        /// Worker threads (default: available parallelism)
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        #[command(flatten)]
        overrides: SegmentationOverrides,
    },
    /// Load and validate the config, then print the effective constants
    Check,
}
