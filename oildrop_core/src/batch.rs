//! Concurrent analysis of independent droplets.
//!
//! Jobs go through a crossbeam work queue to a fixed set of scoped worker
//! threads sharing one `Analyzer`. Outcomes come back in job order.

use crossbeam_channel::unbounded;

use crate::error::AnalysisError;
use crate::pipeline::{Analysis, Analyzer};
use crate::series::PositionSeries;

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub label: String,
    pub series: PositionSeries,
}

impl BatchJob {
    pub fn new(label: impl Into<String>, series: impl Into<PositionSeries>) -> Self {
        Self {
            label: label.into(),
            series: series.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub label: String,
    pub result: Result<Analysis, AnalysisError>,
}

/// Analyze every job on `workers` threads (at least 1, at most one per job).
pub fn analyze_batch(analyzer: &Analyzer, jobs: Vec<BatchJob>, workers: usize) -> Vec<BatchOutcome> {
    let n_jobs = jobs.len();
    if n_jobs == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, n_jobs);

    let (job_tx, job_rx) = unbounded::<(usize, BatchJob)>();
    let (out_tx, out_rx) = unbounded::<(usize, BatchOutcome)>();
    for item in jobs.into_iter().enumerate() {
        // receiver is alive in this scope
        let _ = job_tx.send(item);
    }
    drop(job_tx);

    std::thread::scope(|s| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let out_tx = out_tx.clone();
            s.spawn(move || {
                for (idx, job) in job_rx.iter() {
                    let result = analyzer.analyze(&job.series);
                    if let Err(e) = &result {
                        tracing::debug!(worker, label = %job.label, error = %e, "batch job failed");
                    }
                    if out_tx
                        .send((
                            idx,
                            BatchOutcome {
                                label: job.label,
                                result,
                            },
                        ))
                        .is_err()
                    {
                        break;
                    }
                }
                tracing::trace!(worker, "batch worker exiting");
            });
        }
    });
    drop(out_tx);

    let mut outcomes: Vec<(usize, BatchOutcome)> = out_rx.iter().collect();
    outcomes.sort_by_key(|(idx, _)| *idx);
    outcomes.into_iter().map(|(_, o)| o).collect()
}
