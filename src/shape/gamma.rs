//! Gamma function for shape volume formulas.
//!
//! Power-series evaluation of 1/Γ(z) on |z| ≤ 1 (Abramowitz & Stegun 6.1.34)
//! combined with the recurrence Γ(z+1) = zΓ(z) and the reflection formula for
//! negative arguments. Arguments past [`OVERFLOW_THRESHOLD`] and the poles at
//! non-positive integers return [`GAMMA_OVERFLOW`] instead of `inf`/`NaN`.

use std::f64::consts::PI;

/// Returned when Γ(x) is not representable.
pub const GAMMA_OVERFLOW: f64 = 1.0e308;

/// Largest argument evaluated; Γ(171.62…) exceeds `f64::MAX`.
pub const OVERFLOW_THRESHOLD: f64 = 171.0;

/// Taylor coefficients of 1/Γ(z) around 0, lowest order first (after the
/// leading factor z).
static SERIES: [f64; 26] = [
    1.0,
    0.577_215_664_901_532_9,
    -0.655_878_071_520_253_8,
    -0.420_026_350_340_952e-1,
    0.166_538_611_382_291_5,
    -0.421_977_345_555_443e-1,
    -0.962_197_152_787_7e-2,
    0.721_894_324_666_3e-2,
    -0.116_516_759_185_91e-2,
    -0.215_241_674_114_9e-3,
    0.128_050_282_388_2e-3,
    -0.201_348_547_807e-4,
    -0.125_049_348_21e-5,
    0.113_302_723_2e-5,
    -0.205_633_841_7e-6,
    0.611_609_5e-8,
    0.500_200_75e-8,
    -0.118_127_46e-8,
    0.104_342_7e-9,
    0.778_23e-11,
    -0.369_68e-11,
    0.51e-12,
    -0.206e-13,
    -0.54e-14,
    0.14e-14,
    0.1e-15,
];

/// Γ(x) for real `x`.
pub fn gamma(x: f64) -> f64 {
    if x.is_nan() || x > OVERFLOW_THRESHOLD {
        return GAMMA_OVERFLOW;
    }

    if x == x.trunc() {
        if x <= 0.0 {
            return GAMMA_OVERFLOW;
        }
        // (x - 1)!
        return (2..x as u64).fold(1.0, |acc, i| acc * i as f64);
    }

    let magnitude = x.abs();
    let (z, shift) = if magnitude > 1.0 {
        let whole = magnitude.trunc();
        let shift = (1..=whole as u64).fold(1.0, |acc, k| acc * (magnitude - k as f64));
        (magnitude - whole, shift)
    } else {
        (x, 1.0)
    };

    let reciprocal = SERIES.iter().rev().fold(0.0, |acc, c| acc * z + c);
    let mut value = 1.0 / (reciprocal * z);

    if magnitude > 1.0 {
        value *= shift;
        if x < 0.0 {
            value = -PI / (x * value * (PI * x).sin());
        }
    }
    value
}
