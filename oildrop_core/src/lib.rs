#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Charge estimation for Millikan oil-drop captures.
//!
//! The crate turns a droplet's per-frame vertical position into a charge
//! estimate. It holds no tracker, video, or GUI state; every stage is a pure
//! function over value types.
//!
//! ## Architecture
//!
//! - **Segmentation**: peaks/troughs with boundary forcing (`extrema` module)
//! - **Velocities**: median fall and rise speeds from segment slopes (`velocity`)
//! - **Charge**: viscosity-corrected Stokes model (`charge`)
//! - **Pipeline**: `Analyzer` and `analyze` composing the three (`pipeline`)
//! - **Streaming / batch**: re-analysis of a growing buffer, and concurrent
//!   analysis of independent droplets (`streaming`, `batch`)
//!
//! ## Units
//!
//! Positions are pixels with y pointing down. Velocities leave the velocity
//! stage in mm/s and enter the charge model in m/s.

pub mod batch;
pub mod builder;
pub mod charge;
pub mod conversions;
pub mod error;
pub mod extrema;
pub mod mocks;
pub mod pipeline;
pub mod series;
pub mod streaming;
pub mod util;
pub mod velocity;

pub use batch::{BatchJob, BatchOutcome, analyze_batch};
pub use builder::AnalyzerBuilder;
pub use charge::{
    ChargeEstimate, ChargeEstimator, ELEMENTARY_CHARGE_C, PhysicalConstants, estimate_charge,
};
pub use error::{AnalysisError, BuildError};
pub use extrema::{ProminenceFinder, SegmentationParams, find_extrema, find_extrema_with};
pub use pipeline::{Analysis, Analyzer, analyze};
pub use series::{Extrema, ExtremumKind, ExtremumPoint, PositionSeries, Segment};
pub use streaming::StreamingAnalyzer;
pub use velocity::{Velocities, VelocityEstimator, estimate_velocities};
