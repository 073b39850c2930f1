use oildrop_config::load_toml;
use rstest::rstest;

const FULL: &str = r#"
[apparatus]
voltage_v = 500.0
plate_separation_mm = 4.902

[oil]
density_kg_m3 = 861.0

[environment]
gravity_m_s2 = 9.81
temperature_c = 20.0
pressure_torr = 760.0

[camera]
fps = 30.0
calibration_px_per_mm = 414.2
frame_height_px = 512.0

[segmentation]
min_separation = 100
min_prominence = 100.0
"#;

#[test]
fn accepts_full_bench_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.camera.calibration_px_per_mm, 414.2);
}

#[rstest]
#[case("[apparatus]\nplate_separation_mm = 0.0\n", "plate_separation_mm must be > 0")]
#[case("[apparatus]\nvoltage_v = 0.0\n", "voltage_v must be finite and non-zero")]
#[case("[environment]\npressure_torr = -1.0\n", "pressure_torr must be > 0")]
#[case("[oil]\ndensity_kg_m3 = 0.0\n", "density_kg_m3 must be > 0")]
#[case("[camera]\nfps = 0.0\n", "fps must be > 0")]
#[case("[camera]\ncalibration_px_per_mm = -3.0\n", "calibration_px_per_mm must be > 0")]
#[case("[environment]\ntemperature_c = 250.0\n", "temperature_c must be in [-50, 100]")]
#[case("[segmentation]\nmin_prominence = -0.5\n", "min_prominence must be >= 0")]
#[case("[environment]\ngravity_m_s2 = nan\n", "gravity_m_s2 must be finite")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn rejects_wrong_types_at_parse_time() {
    assert!(load_toml("[segmentation]\nmin_separation = -4\n").is_err());
}
