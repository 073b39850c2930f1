#![no_main]
use libfuzzer_sys::fuzz_target;
use oildrop_core::{PositionSeries, find_extrema};

fuzz_target!(|input: (Vec<f64>, u8, f64)| {
    let (values, sep, prom) = input;
    let n = values.len();
    let series = PositionSeries::new(values);
    if let Ok(ex) = find_extrema(&series, sep as usize, prom) {
        assert!(ex.troughs.first().is_some_and(|p| p.index == 0));
        assert!(ex.merged().iter().all(|p| p.index < n));
    }
});
