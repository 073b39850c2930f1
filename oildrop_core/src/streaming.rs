//! Incremental analysis for hosts that receive frames one at a time.
//!
//! Samples are buffered and the whole pipeline is re-run every `cadence`
//! appended samples. Early results are usually transient errors
//! (`InsufficientData`, `NoSegments`, or a zero rise velocity before the
//! first rise phase completes).

use crate::error::AnalysisError;
use crate::pipeline::{Analysis, Analyzer};
use crate::series::PositionSeries;

pub type StreamResult = Result<Analysis, AnalysisError>;

#[derive(Debug)]
pub struct StreamingAnalyzer {
    analyzer: Analyzer,
    buffer: PositionSeries,
    cadence: usize,
    pending: usize,
    latest: Option<StreamResult>,
}

impl StreamingAnalyzer {
    /// `cadence` of 0 acts as 1 (re-run on every sample).
    pub fn new(analyzer: Analyzer, cadence: usize) -> Self {
        Self {
            analyzer,
            buffer: PositionSeries::default(),
            cadence: cadence.max(1),
            pending: 0,
            latest: None,
        }
    }

    /// Append one sample; returns a fresh result when the cadence is reached.
    pub fn push(&mut self, y: f64) -> Option<&StreamResult> {
        self.buffer.push(y);
        self.pending += 1;
        if self.pending >= self.cadence {
            Some(self.flush())
        } else {
            None
        }
    }

    pub fn extend<I: IntoIterator<Item = f64>>(&mut self, samples: I) -> Option<&StreamResult> {
        let mut fired = false;
        for y in samples {
            self.buffer.push(y);
            self.pending += 1;
            if self.pending >= self.cadence {
                self.recompute();
                fired = true;
            }
        }
        if fired { self.latest.as_ref() } else { None }
    }

    /// Re-run the pipeline on everything buffered so far.
    pub fn flush(&mut self) -> &StreamResult {
        self.recompute();
        self.latest.get_or_insert(Err(AnalysisError::InsufficientData { len: 0 }))
    }

    fn recompute(&mut self) {
        self.pending = 0;
        let result = self.analyzer.analyze(&self.buffer);
        if let Err(e) = &result {
            tracing::trace!(samples = self.buffer.len(), error = %e, "stream not ready");
        }
        self.latest = Some(result);
    }

    pub fn latest(&self) -> Option<&StreamResult> {
        self.latest.as_ref()
    }

    pub fn series(&self) -> &PositionSeries {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn reset(&mut self) {
        self.buffer = PositionSeries::default();
        self.pending = 0;
        self.latest = None;
    }
}
