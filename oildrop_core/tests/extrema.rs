use oildrop_core::error::AnalysisError;
use oildrop_core::{ExtremumKind, PositionSeries, ProminenceFinder, find_extrema, find_extrema_with};
use oildrop_traits::ExtremaFinder;
use rstest::rstest;

fn indices(points: &[oildrop_core::ExtremumPoint]) -> Vec<usize> {
    points.iter().map(|p| p.index).collect()
}

/// Sawtooth in pixel space: falls 2 px/frame for 150 frames, rises 5 px/frame
/// for 60 frames, three cycles, then stops mid-fall at frame 705.
fn bench_sawtooth() -> PositionSeries {
    (0..=705usize)
        .map(|t| {
            let phase = t % 210;
            if phase <= 150 {
                100.0 + 2.0 * phase as f64
            } else {
                400.0 - 5.0 * (phase - 150) as f64
            }
        })
        .collect()
}

#[rstest]
fn three_point_dip_forces_both_ends() {
    let series = PositionSeries::new(vec![0.5, 0.3, 0.5]);
    let ex = find_extrema(&series, 1, 0.01).unwrap();
    assert_eq!(indices(&ex.troughs), vec![0, 1]);
    // last raw extremum was the trough at 1, so the final frame closes as a peak
    assert_eq!(indices(&ex.peaks), vec![2]);
    assert!(ex.troughs.iter().all(|p| p.kind == ExtremumKind::Trough));
    assert_eq!(ex.peaks[0].value, 0.5);
}

#[rstest]
fn sawtooth_segments_into_alternating_extrema() {
    let ex = find_extrema(&bench_sawtooth(), 100, 100.0).unwrap();
    assert_eq!(indices(&ex.troughs), vec![0, 210, 420, 630]);
    assert_eq!(indices(&ex.peaks), vec![150, 360, 570, 705]);
    let kinds: Vec<ExtremumKind> = ex.merged().iter().map(|p| p.kind).collect();
    for pair in kinds.windows(2) {
        assert_ne!(pair[0], pair[1], "extrema should alternate");
    }
}

#[rstest]
fn ending_after_a_peak_forces_final_trough() {
    // trimmed so the capture stops while rising, after the peak at 360
    let series: PositionSeries = bench_sawtooth().values()[..400].iter().copied().collect();
    let ex = find_extrema(&series, 100, 100.0).unwrap();
    assert_eq!(indices(&ex.peaks), vec![150, 360]);
    assert_eq!(indices(&ex.troughs), vec![0, 210, 399]);
}

#[rstest]
fn monotonic_series_only_gets_initial_trough() {
    let series: PositionSeries = (0..50).map(|t| t as f64).collect();
    let ex = find_extrema(&series, 1, 0.0).unwrap();
    assert_eq!(indices(&ex.troughs), vec![0]);
    assert!(ex.peaks.is_empty());
}

#[rstest]
fn prominence_threshold_suppresses_jitter() {
    let mut y: Vec<f64> = bench_sawtooth().into_inner();
    // a 3 px tracking jitter in the middle of a fall
    y[60] += 3.0;
    let ex = find_extrema(&PositionSeries::new(y), 100, 100.0).unwrap();
    assert_eq!(indices(&ex.peaks), vec![150, 360, 570, 705]);
}

#[rstest]
#[case(vec![])]
#[case(vec![0.42])]
fn too_short_series_is_insufficient(#[case] y: Vec<f64>) {
    let len = y.len();
    let err = find_extrema(&PositionSeries::new(y), 1, 0.0).unwrap_err();
    assert_eq!(err, AnalysisError::InsufficientData { len });
    assert!(err.is_transient());
}

#[rstest]
fn two_samples_are_enough() {
    let ex = find_extrema(&PositionSeries::new(vec![1.0, 2.0]), 1, 0.0).unwrap();
    assert_eq!(indices(&ex.troughs), vec![0]);
}

/// Finder that reports fixed indices, to exercise the boundary policy alone.
struct Fixed {
    peaks: Vec<usize>,
    troughs: Vec<usize>,
}

impl ExtremaFinder for Fixed {
    fn find_local_extrema(&self, values: &[f64], _sep: usize, _prom: f64) -> Vec<usize> {
        // troughs are searched on the negated series, whose first value is <= 0 here
        if values[0] <= 0.0 { self.troughs.clone() } else { self.peaks.clone() }
    }
}

#[rstest]
fn detected_zero_trough_is_not_duplicated() {
    let finder = Fixed {
        peaks: vec![3],
        troughs: vec![0, 6],
    };
    let series = PositionSeries::new(vec![1.0; 10]);
    let ex = find_extrema_with(&finder, &series, 1, 0.0).unwrap();
    assert_eq!(indices(&ex.troughs), vec![0, 6]);
    assert_eq!(indices(&ex.peaks), vec![3, 9]);
}

#[rstest]
fn custom_finder_output_is_sorted() {
    let finder = Fixed {
        peaks: vec![7, 2],
        troughs: vec![5],
    };
    let series = PositionSeries::new(vec![1.0; 10]);
    let ex = find_extrema_with(&finder, &series, 1, 0.0).unwrap();
    assert_eq!(indices(&ex.peaks), vec![2, 7]);
    assert_eq!(indices(&ex.troughs), vec![0, 5, 9]);
    // default finder finds nothing in a constant series
    assert!(ProminenceFinder.find_local_extrema(series.values(), 1, 0.0).is_empty());
}

#[rstest]
fn out_of_range_finder_indices_are_dropped() {
    let series = PositionSeries::new(vec![1.0; 10]);
    let finder = Fixed {
        peaks: vec![4, 15],
        troughs: vec![10, 2],
    };
    let ex = find_extrema_with(&finder, &series, 1, 0.0).unwrap();
    // surviving raw extrema are trough 2 then peak 4, so the end closes as a trough
    assert_eq!(indices(&ex.peaks), vec![4]);
    assert_eq!(indices(&ex.troughs), vec![0, 2, 9]);
    assert!(ex.merged().iter().all(|p| p.index < series.len()));
}

#[rstest]
fn repeated_finder_indices_collapse() {
    let series = PositionSeries::new(vec![1.0; 10]);
    let finder = Fixed {
        peaks: vec![3, 3],
        troughs: vec![6, 0, 6],
    };
    let ex = find_extrema_with(&finder, &series, 1, 0.0).unwrap();
    assert_eq!(indices(&ex.peaks), vec![3, 9]);
    assert_eq!(indices(&ex.troughs), vec![0, 6]);
}
