use oildrop_core::error::{AnalysisError, BuildError};
use oildrop_core::mocks::VecSource;
use oildrop_core::{
    Analyzer, BatchJob, PhysicalConstants, PositionSeries, SegmentationParams, StreamingAnalyzer,
    analyze, analyze_batch, estimate_charge,
};
use oildrop_traits::PositionSource;
use rstest::{fixture, rstest};

/// Falls 2 px/frame for 150 frames, rises 5 px/frame for 60, ending mid-fall.
fn sawtooth(len: usize) -> Vec<f64> {
    (0..len)
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

#[fixture]
fn analyzer() -> Analyzer {
    Analyzer::builder()
        .with_constants(PhysicalConstants::default())
        .with_segmentation(SegmentationParams {
            min_separation: 100,
            min_prominence: 100.0,
        })
        .try_build()
        .unwrap()
}

#[rstest]
fn sawtooth_analysis_matches_stage_by_stage(analyzer: Analyzer) {
    let series = PositionSeries::new(sawtooth(706));
    let a = analyzer.analyze(&series).unwrap();

    let c = PhysicalConstants::default();
    let fall_mm_s = 2.0 * c.fps / c.calibration_px_per_mm;
    let rise_mm_s = 5.0 * c.fps / c.calibration_px_per_mm;
    assert!((a.velocities.fall_mm_s - fall_mm_s).abs() < 1e-12);
    assert!((a.velocities.rise_mm_s - rise_mm_s).abs() < 1e-12);

    let expected = estimate_charge(rise_mm_s * 1e-3, fall_mm_s * 1e-3, &c).unwrap();
    assert!((a.charge.charge_coulombs - expected.charge_coulombs).abs() < 1e-30);
    assert!(a.charge.interval > 0.0);

    let free = analyze(&series, analyzer.params(), analyzer.constants()).unwrap();
    assert_eq!(free, a);
}

#[rstest]
fn analyze_source_pulls_from_source(analyzer: Analyzer) {
    let mut src = VecSource(sawtooth(706));
    let a = analyzer.analyze_source(&mut src).unwrap();
    assert_eq!(a.extrema.peaks.len(), 4);
}

struct BrokenSource;
impl PositionSource for BrokenSource {
    fn positions(&mut self) -> Result<Vec<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Err("tracker lost the droplet".into())
    }
}

#[rstest]
fn source_errors_are_wrapped(analyzer: Analyzer) {
    let err = analyzer.analyze_source(&mut BrokenSource).unwrap_err();
    assert!(format!("{err}").contains("tracker lost the droplet"));
}

#[rstest]
fn analysis_errors_stay_typed_through_eyre(analyzer: Analyzer) {
    let err = analyzer.analyze_source(&mut VecSource(vec![1.0])).unwrap_err();
    match err.downcast_ref::<AnalysisError>() {
        Some(AnalysisError::InsufficientData { len: 1 }) => {}
        other => panic!("expected InsufficientData, got: {other:?}"),
    }
}

#[rstest]
#[case(vec![200.0], AnalysisError::InsufficientData { len: 1 })]
#[case(vec![200.0; 20], AnalysisError::NoSegments { points: 1 })]
fn free_analyze_returns_typed_errors(#[case] y: Vec<f64>, #[case] expected: AnalysisError) {
    let err = analyze(
        &PositionSeries::new(y),
        &SegmentationParams::default(),
        &PhysicalConstants::default(),
    )
    .unwrap_err();
    assert_eq!(err, expected);
}

#[rstest]
fn builder_missing_constants_yields_typed_build_error() {
    let err = Analyzer::builder()
        .with_segmentation(SegmentationParams::default())
        .try_build()
        .expect_err("should fail with MissingConstants");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingConstants) => {}
        other => panic!("expected MissingConstants, got: {other:?}"),
    }
}

#[rstest]
fn builder_rejects_invalid_constants() {
    let err = Analyzer::builder()
        .with_constants(PhysicalConstants {
            pressure_torr: 0.0,
            ..PhysicalConstants::default()
        })
        .try_build()
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::InvalidConstants(_))
    ));
}

#[rstest]
fn builder_takes_config_file_values() {
    let cfg = oildrop_config::load_toml("[environment]\npressure_torr = 700.0\n").unwrap();
    let a = Analyzer::builder().with_config(&cfg).try_build().unwrap();
    assert_eq!(a.constants().pressure_torr, 700.0);
    assert_eq!(a.params().min_separation, 100);
}

#[rstest]
fn streaming_reports_transient_errors_then_a_charge(analyzer: Analyzer) {
    let mut stream = StreamingAnalyzer::new(analyzer, 50);
    let samples = sawtooth(706);

    // first cadence tick: only one fall so far, no rise yet
    let mut first = None;
    for &y in &samples[..50] {
        if let Some(r) = stream.push(y) {
            first = Some(r.clone());
        }
    }
    let first = first.expect("cadence reached at 50 samples");
    assert!(first.is_err());

    stream.extend(samples[50..].iter().copied());
    let last = stream.flush().clone().unwrap();
    assert_eq!(stream.len(), 706);
    assert_eq!(last.extrema.peaks.len(), 4);
    assert!(last.charge.charge_coulombs > 0.0);

    stream.reset();
    assert!(stream.is_empty());
    assert!(stream.latest().is_none());
}

#[rstest]
fn batch_returns_outcomes_in_job_order(analyzer: Analyzer) {
    let jobs = vec![
        BatchJob::new("good-a", sawtooth(706)),
        BatchJob::new("short", vec![1.0]),
        BatchJob::new("good-b", sawtooth(500)),
        BatchJob::new("flat", vec![5.0; 300]),
    ];
    let out = analyze_batch(&analyzer, jobs, 3);
    let labels: Vec<&str> = out.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["good-a", "short", "good-b", "flat"]);
    assert!(out[0].result.is_ok());
    assert_eq!(
        out[1].result.as_ref().unwrap_err(),
        &AnalysisError::InsufficientData { len: 1 }
    );
    assert!(out[2].result.is_ok());
    // constant series: only the forced trough at 0, so no segment
    assert_eq!(
        out[3].result.as_ref().unwrap_err(),
        &AnalysisError::NoSegments { points: 1 }
    );
}

#[rstest]
fn batch_of_nothing_is_empty(analyzer: Analyzer) {
    assert!(analyze_batch(&analyzer, Vec::new(), 4).is_empty());
}
