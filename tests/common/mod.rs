//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use gridflow::pipeline::RunReport;

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Error codes of a report, in order.
pub fn error_codes(report: &RunReport) -> Vec<i32> {
    report.errors().map(|d| d.code).collect()
}
