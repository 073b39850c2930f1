use oildrop_core::error::AnalysisError;
use oildrop_core::{ChargeEstimator, ELEMENTARY_CHARGE_C, PhysicalConstants, estimate_charge};
use rstest::rstest;

fn bench() -> PhysicalConstants {
    PhysicalConstants {
        voltage_v: 500.0,
        plate_separation_m: 4.902e-3,
        oil_density_kg_m3: 861.0,
        gravity_m_s2: 9.81,
        temperature_c: 20.0,
        pressure_torr: 760.0,
        calibration_px_per_mm: 414.20,
        fps: 30.0,
    }
}

fn rel_close(a: f64, b: f64, tol: f64) -> bool {
    ((a - b) / b).abs() < tol
}

#[rstest]
fn bench_droplet_regression() {
    let est = estimate_charge(2.108e-4, 7.087e-5, &bench()).unwrap();
    assert!(rel_close(est.charge_coulombs, 6.853586771782543e-19, 1e-9));
    assert!(rel_close(est.interval, 4.277672402868499, 1e-9));
    assert!(rel_close(est.radius_m, 7.921824703443695e-7, 1e-9));
    assert!(rel_close(est.viscosity_pa_s, 1.6620637144391385e-5, 1e-9));
    assert!(rel_close(est.mass_kg, 1.792946970225723e-15, 1e-9));
    assert!((1e-19..1e-18).contains(&est.charge_coulombs));
    assert!((est.interval - est.charge_coulombs / ELEMENTARY_CHARGE_C).abs() < 1e-12);
}

#[rstest]
fn estimator_matches_one_shot() {
    let e = ChargeEstimator::new(bench()).unwrap();
    let a = e.estimate(2.108e-4, 7.087e-5).unwrap();
    let b = estimate_charge(2.108e-4, 7.087e-5, &bench()).unwrap();
    assert_eq!(a, b);
}

#[rstest]
fn charge_grows_with_rise_velocity() {
    let e = ChargeEstimator::new(bench()).unwrap();
    let mut prev = 0.0;
    for k in 1..=20 {
        let q = e.estimate(k as f64 * 2e-5, 7.087e-5).unwrap().charge_coulombs;
        assert!(q > prev, "charge must increase with rise velocity");
        prev = q;
    }
}

#[rstest]
fn lower_pressure_means_stronger_slip_correction() {
    let hi = estimate_charge(2.108e-4, 7.087e-5, &bench()).unwrap();
    let lo = estimate_charge(
        2.108e-4,
        7.087e-5,
        &PhysicalConstants {
            pressure_torr: 380.0,
            ..bench()
        },
    )
    .unwrap();
    assert!(lo.viscosity_pa_s < hi.viscosity_pa_s);
}

#[rstest]
#[case(0.0, 1.0, "v_rise_m_s")]
#[case(-1e-4, 1e-4, "v_rise_m_s")]
#[case(1e-4, 0.0, "v_fall_m_s")]
#[case(1e-4, -3e-5, "v_fall_m_s")]
#[case(f64::NAN, 1e-4, "v_rise_m_s")]
#[case(1e-4, f64::INFINITY, "v_fall_m_s")]
fn non_positive_velocities_are_rejected(
    #[case] v_rise: f64,
    #[case] v_fall: f64,
    #[case] which: &str,
) {
    let err = estimate_charge(v_rise, v_fall, &bench()).unwrap_err();
    match err {
        AnalysisError::InvalidVelocity { name, .. } => assert_eq!(name, which),
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[rstest]
#[case(PhysicalConstants { plate_separation_m: 0.0, ..bench() }, "plate_separation_m")]
#[case(PhysicalConstants { pressure_torr: -760.0, ..bench() }, "pressure_torr")]
#[case(PhysicalConstants { oil_density_kg_m3: 0.0, ..bench() }, "oil_density_kg_m3")]
#[case(PhysicalConstants { gravity_m_s2: f64::NAN, ..bench() }, "gravity_m_s2")]
#[case(PhysicalConstants { temperature_c: -500.0, ..bench() }, "temperature_c")]
fn invalid_constants_are_rejected(#[case] c: PhysicalConstants, #[case] needle: &str) {
    let err = estimate_charge(2.108e-4, 7.087e-5, &c).unwrap_err();
    match &err {
        AnalysisError::InvalidConstants(msg) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("unexpected error variant: {other:?}"),
    }
    assert!(!err.is_transient());
}
