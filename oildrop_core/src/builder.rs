//! Builder for `Analyzer`.
//!
//! Constants are required; segmentation parameters and the extrema finder
//! fall back to their defaults. Everything is validated in `try_build()`.

use oildrop_traits::ExtremaFinder;

use crate::charge::{ChargeEstimator, PhysicalConstants};
use crate::error::{BuildError, Result};
use crate::extrema::{ProminenceFinder, SegmentationParams};
use crate::pipeline::Analyzer;
use crate::velocity::VelocityEstimator;

#[derive(Default)]
pub struct AnalyzerBuilder {
    constants: Option<PhysicalConstants>,
    segmentation: Option<SegmentationParams>,
    finder: Option<Box<dyn ExtremaFinder>>,
}

impl AnalyzerBuilder {
    pub fn with_constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = Some(constants);
        self
    }

    pub fn with_segmentation(mut self, params: SegmentationParams) -> Self {
        self.segmentation = Some(params);
        self
    }

    pub fn with_finder(mut self, finder: impl ExtremaFinder + 'static) -> Self {
        self.finder = Some(Box::new(finder));
        self
    }

    /// Take constants and segmentation from a parsed config file.
    pub fn with_config(self, cfg: &oildrop_config::Config) -> Self {
        self.with_constants(cfg.into())
            .with_segmentation((&cfg.segmentation).into())
    }

    pub fn try_build(self) -> Result<Analyzer> {
        let constants = self.constants.ok_or(BuildError::MissingConstants)?;
        let params = self.segmentation.unwrap_or_default();
        if !(params.min_prominence.is_finite() && params.min_prominence >= 0.0) {
            return Err(BuildError::InvalidConfig("min_prominence must be finite and >= 0").into());
        }
        let finder = self
            .finder
            .unwrap_or_else(|| Box::new(ProminenceFinder));

        let velocity = VelocityEstimator::from_constants(&constants)?;
        let charge = ChargeEstimator::new(constants)?;
        Ok(Analyzer {
            params,
            velocity,
            charge,
            finder,
        })
    }
}
