//! Position series → extrema → velocities → charge.

use oildrop_traits::{ExtremaFinder, PositionSource};

use crate::builder::AnalyzerBuilder;
use crate::charge::{ChargeEstimate, ChargeEstimator, PhysicalConstants};
use crate::error::{AnalysisError, Result};
use crate::extrema::{SegmentationParams, find_extrema, find_extrema_with};
use crate::series::{Extrema, PositionSeries};
use crate::velocity::{Velocities, VelocityEstimator};

/// Everything computed for one droplet.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub extrema: Extrema,
    pub velocities: Velocities,
    pub charge: ChargeEstimate,
}

/// Run the full pipeline with the default extrema finder.
pub fn analyze(
    series: &PositionSeries,
    params: &SegmentationParams,
    constants: &PhysicalConstants,
) -> std::result::Result<Analysis, AnalysisError> {
    let charge = ChargeEstimator::new(*constants)?;
    let velocity = VelocityEstimator::from_constants(constants)?;
    let extrema = find_extrema(series, params.min_separation, params.min_prominence)?;
    let velocities = velocity.estimate(&extrema.peaks, &extrema.troughs)?;
    let charge = charge.estimate(velocities.rise_m_s(), velocities.fall_m_s())?;
    Ok(Analysis {
        extrema,
        velocities,
        charge,
    })
}

/// Reusable pipeline holding validated constants and a finder.
///
/// Holds no per-call state, so one analyzer can serve many series, including
/// from several threads at once.
pub struct Analyzer {
    pub(crate) params: SegmentationParams,
    pub(crate) velocity: VelocityEstimator,
    pub(crate) charge: ChargeEstimator,
    pub(crate) finder: Box<dyn ExtremaFinder>,
}

impl core::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Analyzer")
            .field("params", &self.params)
            .field("constants", self.charge.constants())
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }

    pub fn constants(&self) -> &PhysicalConstants {
        self.charge.constants()
    }

    pub fn segment(&self, series: &PositionSeries) -> std::result::Result<Extrema, AnalysisError> {
        find_extrema_with(
            &self.finder,
            series,
            self.params.min_separation,
            self.params.min_prominence,
        )
    }

    pub fn velocities(&self, extrema: &Extrema) -> std::result::Result<Velocities, AnalysisError> {
        self.velocity.estimate(&extrema.peaks, &extrema.troughs)
    }

    pub fn charge(&self, velocities: &Velocities) -> std::result::Result<ChargeEstimate, AnalysisError> {
        self.charge
            .estimate(velocities.rise_m_s(), velocities.fall_m_s())
    }

    pub fn analyze(&self, series: &PositionSeries) -> std::result::Result<Analysis, AnalysisError> {
        let extrema = self.segment(series)?;
        let velocities = self.velocities(&extrema)?;
        let charge = self.charge(&velocities)?;
        tracing::debug!(
            samples = series.len(),
            charge_c = charge.charge_coulombs,
            interval = charge.interval,
            "analysis complete"
        );
        Ok(Analysis {
            extrema,
            velocities,
            charge,
        })
    }

    /// Pull the series from `source` and analyze it. Analysis failures stay
    /// downcastable to [`AnalysisError`].
    pub fn analyze_source<S: PositionSource + ?Sized>(&self, source: &mut S) -> Result<Analysis> {
        let values = source
            .positions()
            .map_err(|e| eyre::eyre!("position source failed: {e}"))?;
        Ok(self.analyze(&PositionSeries::new(values))?)
    }
}
