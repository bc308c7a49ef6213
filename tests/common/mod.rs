//! Shared series generators and comparison helpers for the integration tests.
#![allow(dead_code)]

use std::f64::consts::TAU;

/// `100 + amplitude * sin(2πt / period)`.
pub fn sine_series(len: usize, period: f64, amplitude: f64) -> Vec<f64> {
    (0..len)
        .map(|t| 100.0 + amplitude * (TAU * t as f64 / period).sin())
        .collect()
}

/// `100 + slope * t`.
pub fn ramp_series(len: usize, slope: f64) -> Vec<f64> {
    (0..len).map(|t| 100.0 + slope * t as f64).collect()
}

/// Cumulative sum of `steps`, starting at 100.
pub fn walk_from_steps(steps: &[f64]) -> Vec<f64> {
    steps
        .iter()
        .scan(100.0, |level, step| {
            *level += step;
            Some(*level)
        })
        .collect()
}

/// Compare two arrays with a tolerance. Matching `NaN`s are equal.
pub fn assert_array_close(actual: &[f64], expected: &[f64], rtol: f64, atol: f64, name: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: Length mismatch: actual {} vs expected {}",
        name,
        actual.len(),
        expected.len()
    );

    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        if a.is_nan() && e.is_nan() {
            continue;
        }

        let diff = (a - e).abs();
        let tol = atol + rtol * e.abs();

        assert!(
            diff <= tol,
            "{}: Value mismatch at index {}: actual {} vs expected {} (diff: {}, tol: {})",
            name,
            i,
            a,
            e,
            diff,
            tol
        );
    }
}
