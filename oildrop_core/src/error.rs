use thiserror::Error;

/// Failures of the analysis stages.
///
/// `InsufficientData` and `NoSegments` are expected while a capture is still
/// short; the other two mean the inputs to the physical model are malformed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("insufficient data: need at least 2 samples, got {len}")]
    InsufficientData { len: usize },
    #[error("no segments: need at least 2 extrema to form a segment, got {points}")]
    NoSegments { points: usize },
    #[error("invalid velocity: {name} must be finite and > 0, got {value}")]
    InvalidVelocity { name: &'static str, value: f64 },
    #[error("invalid constants: {0}")]
    InvalidConstants(String),
}

impl AnalysisError {
    /// True when more frames could make the analysis succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientData { .. } | AnalysisError::NoSegments { .. }
        )
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing physical constants")]
    MissingConstants,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
