//! Circular angle arithmetic.
//!
//! Headings live on a circle: any two values that differ by a multiple of 2π
//! name the same wheel direction. The canonical representation used across the
//! crate is the half-open interval (−π, π], and every subtraction of two
//! headings goes through [`shortest_error`].
//!
//! # Example
//! ```rust
//! use core::f32::consts::PI;
//! use swerve_core::utils::math::angle::{shortest_error, wrap_to_signed_range};
//!
//! assert!((wrap_to_signed_range(3.0 * PI) - PI).abs() < 1e-5);
//! // Crossing the ±π seam is a short hop, not a full turn.
//! let err = shortest_error(PI - 0.1, -PI + 0.1);
//! assert!((err + 0.2).abs() < 1e-5);
//! ```
use core::f32::consts::{PI, TAU};

/// Map any angle (rad) into (−π, π].
///
/// Non-finite input yields NaN.
#[inline]
pub fn wrap_to_signed_range(angle: f32) -> f32 {
    let a = angle % TAU;
    if a > PI {
        a - TAU
    } else if a <= -PI {
        a + TAU
    } else {
        a
    }
}

/// Signed minimal rotation (rad) that takes `current` onto `target`.
///
/// The magnitude is in [0, π]; a positive result is counter-clockwise.
#[inline]
pub fn shortest_error(
    target: f32,
    current: f32,
) -> f32 {
    wrap_to_signed_range(target - current)
}

/// Whether two headings are within `tolerance` rad of each other on the circle.
#[inline]
pub fn angles_approx_eq(
    a: f32,
    b: f32,
    tolerance: f32,
) -> bool {
    libm::fabsf(shortest_error(a, b)) <= tolerance
}

#[inline]
pub fn degrees_to_radians(deg: f32) -> f32 {
    deg * (PI / 180.0)
}

#[inline]
pub fn radians_to_degrees(rad: f32) -> f32 {
    rad * (180.0 / PI)
}
