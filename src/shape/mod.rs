//! Shape operations used by synthesis filters.
//!
//! A [`ShapeOps`] value answers two questions for one primitive shape:
//!
//! - **Radius from volume**: the characteristic radius `a` (semi-axis along
//!   the first axis) of a shape with aspect ratios `b/a`, `c/a` enclosing a
//!   given volume.
//! - **Inside test**: for a point expressed in normalized axis coordinates
//!   (offset along each axis divided by that axis' radius), a signed value
//!   that is non-negative inside or on the boundary and negative outside.
//!
//! | Shape | Volume | Inside |
//! |---|---|---|
//! | Ellipsoid | 4/3·π·abc | 1 − a1² − a2² − a3² |
//! | SuperEllipsoid(n) | 8abc·Γ(1+1/n)³ / Γ(1+3/n) | 1 − \|a1\|ⁿ − \|a2\|ⁿ − \|a3\|ⁿ |
//! | Cube | 8abc | 1 − max(\|a1\|, \|a2\|, \|a3\|) |
//! | Cylinder (axis along a) | 2π·abc | min(1 − \|a1\|, 1 − a2² − a3²) |
//! | Unknown | none (radius 1) | −1 |
//!
//! `Unknown` is the placeholder used when a shape tag matches nothing: its
//! radius is flagged as not computed and it contains no point.

pub mod gamma;

pub use gamma::{gamma, GAMMA_OVERFLOW};

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use thiserror::Error;

/// Invalid geometric input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Volume must be positive, got {0}")]
    NonPositiveVolume(f64),

    #[error("Aspect ratios must be positive, got b/a={b_over_a}, c/a={c_over_a}")]
    NonPositiveAspect { b_over_a: f64, c_over_a: f64 },

    #[error("Super-ellipsoid exponent must be positive, got {0}")]
    BadExponent(f64),

    #[error("Super-ellipsoid exponent {0} overflows the gamma function")]
    Overflow(f64),
}

/// Shape tag, as stored in filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShapeKind {
    #[default]
    Ellipsoid,
    SuperEllipsoid,
    Cube,
    Cylinder,
    Unknown,
}

impl ShapeKind {
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Ellipsoid,
            ShapeKind::SuperEllipsoid,
            ShapeKind::Cube,
            ShapeKind::Cylinder,
            ShapeKind::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Ellipsoid => "ellipsoid",
            ShapeKind::SuperEllipsoid => "super_ellipsoid",
            ShapeKind::Cube => "cube",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown shape '{}'", s))
    }
}

/// Result of a radius computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusEstimate {
    pub radius: f64,
    /// False when the shape had no formula and `radius` is the unit fallback.
    pub computed: bool,
}

/// Shape operations for one primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeOps {
    Ellipsoid,
    SuperEllipsoid { exponent: f64 },
    Cube,
    Cylinder,
    Unknown,
}

impl ShapeOps {
    /// Select operations for `kind`. `exponent` only matters for super-ellipsoids.
    pub fn for_kind(kind: ShapeKind, exponent: f64) -> Self {
        match kind {
            ShapeKind::Ellipsoid => ShapeOps::Ellipsoid,
            ShapeKind::SuperEllipsoid => ShapeOps::SuperEllipsoid { exponent },
            ShapeKind::Cube => ShapeOps::Cube,
            ShapeKind::Cylinder => ShapeOps::Cylinder,
            ShapeKind::Unknown => ShapeOps::Unknown,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeOps::Ellipsoid => ShapeKind::Ellipsoid,
            ShapeOps::SuperEllipsoid { .. } => ShapeKind::SuperEllipsoid,
            ShapeOps::Cube => ShapeKind::Cube,
            ShapeOps::Cylinder => ShapeKind::Cylinder,
            ShapeOps::Unknown => ShapeKind::Unknown,
        }
    }

    /// Volume of this shape per unit `a³`, i.e. V = factor · a³ · (b/a) · (c/a).
    fn volume_factor(&self) -> Result<Option<f64>, ShapeError> {
        Ok(match *self {
            ShapeOps::Ellipsoid => Some(4.0 / 3.0 * PI),
            ShapeOps::SuperEllipsoid { exponent } => {
                if exponent.is_nan() || exponent <= 0.0 {
                    return Err(ShapeError::BadExponent(exponent));
                }
                let numerator = gamma(1.0 + 1.0 / exponent);
                let denominator = gamma(1.0 + 3.0 / exponent);
                if numerator >= GAMMA_OVERFLOW || denominator >= GAMMA_OVERFLOW {
                    return Err(ShapeError::Overflow(exponent));
                }
                Some(8.0 * numerator.powi(3) / denominator)
            }
            ShapeOps::Cube => Some(8.0),
            ShapeOps::Cylinder => Some(2.0 * PI),
            ShapeOps::Unknown => None,
        })
    }

    /// Radius `a` of the shape with aspect ratios `b_over_a`, `c_over_a`
    /// enclosing `volume`.
    pub fn radius_from_volume_and_aspect(
        &self,
        volume: f64,
        b_over_a: f64,
        c_over_a: f64,
    ) -> Result<RadiusEstimate, ShapeError> {
        if volume.is_nan() || volume <= 0.0 {
            return Err(ShapeError::NonPositiveVolume(volume));
        }
        if b_over_a.is_nan() || c_over_a.is_nan() || b_over_a <= 0.0 || c_over_a <= 0.0 {
            return Err(ShapeError::NonPositiveAspect { b_over_a, c_over_a });
        }
        match self.volume_factor()? {
            Some(factor) => Ok(RadiusEstimate {
                radius: (volume / (factor * b_over_a * c_over_a)).cbrt(),
                computed: true,
            }),
            None => Ok(RadiusEstimate {
                radius: 1.0,
                computed: false,
            }),
        }
    }

    /// Volume enclosed by the shape with radius `a` and the given aspect ratios.
    pub fn volume(&self, radius: f64, b_over_a: f64, c_over_a: f64) -> Result<f64, ShapeError> {
        Ok(self
            .volume_factor()?
            .map(|factor| factor * radius.powi(3) * b_over_a * c_over_a)
            .unwrap_or(0.0))
    }

    /// Signed containment of a normalized point; `>= 0` means inside.
    #[inline]
    pub fn inside_test(&self, a1: f64, a2: f64, a3: f64) -> f64 {
        match *self {
            ShapeOps::Ellipsoid => 1.0 - a1 * a1 - a2 * a2 - a3 * a3,
            ShapeOps::SuperEllipsoid { exponent } => {
                1.0 - a1.abs().powf(exponent) - a2.abs().powf(exponent) - a3.abs().powf(exponent)
            }
            ShapeOps::Cube => 1.0 - a1.abs().max(a2.abs()).max(a3.abs()),
            ShapeOps::Cylinder => (1.0 - a1.abs()).min(1.0 - a2 * a2 - a3 * a3),
            ShapeOps::Unknown => -1.0,
        }
    }

    #[inline]
    pub fn contains(&self, a1: f64, a2: f64, a3: f64) -> bool {
        self.inside_test(a1, a2, a3) >= 0.0
    }
}

/// Diameter of the sphere with the given volume.
pub fn equivalent_sphere_diameter(volume: f64) -> f64 {
    2.0 * (0.75 * volume / PI).cbrt()
}
