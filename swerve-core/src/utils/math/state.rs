//! Wheel state types and the steering optimizer.
//!
//! A swerve wheel pointed at θ and rolling forward moves the robot the same way
//! as the wheel pointed at θ + π rolling backward. [`optimize`] uses that
//! symmetry so the steering never has to sweep more than a quarter turn.
//!
//! # Example
//! ```rust
//! use swerve_core::utils::math::angle::degrees_to_radians;
//! use swerve_core::utils::math::state::{optimize, ModuleState};
//!
//! let desired = ModuleState::new(2.0, degrees_to_radians(100.0));
//! let out = optimize(desired, 0.0);
//! assert!((out.heading - degrees_to_radians(-80.0)).abs() < 1e-5);
//! assert_eq!(out.speed, -2.0);
//! ```
use core::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use super::angle::{shortest_error, wrap_to_signed_range};

/// Commanded or measured wheel state.
///
/// `speed` is signed (m/s) along the wheel's rolling axis; `heading` is in
/// radians, canonical range (−π, π].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    pub speed: f32,
    pub heading: f32,
}

impl ModuleState {
    pub fn new(
        speed: f32,
        heading: f32,
    ) -> Self {
        Self { speed, heading }
    }
}

/// Accumulated wheel travel (m) together with the current heading (rad).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulePosition {
    pub distance: f32,
    pub heading: f32,
}

/// Terminal output of one control tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Drive velocity setpoint in the drive controller's native units.
    pub drive_setpoint: f32,
    /// Turn motor output fraction, always within [−1, 1].
    pub turn_output: f32,
}

/// What to do when the requested rotation is exactly a quarter turn.
///
/// Both branches sweep the same steering distance, so this is a drivetrain
/// preference rather than a correctness question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipPolicy {
    /// Keep the requested heading at exactly π/2 of rotation.
    #[default]
    KeepAtQuarterTurn,
    /// Flip the wheel at exactly π/2 of rotation.
    FlipAtQuarterTurn,
}

impl FlipPolicy {
    fn should_flip(
        self,
        delta: f32,
    ) -> bool {
        let magnitude = libm::fabsf(delta);
        match self {
            FlipPolicy::KeepAtQuarterTurn => magnitude > FRAC_PI_2,
            FlipPolicy::FlipAtQuarterTurn => magnitude >= FRAC_PI_2,
        }
    }
}

/// Minimise steering rotation using the default [`FlipPolicy`].
pub fn optimize(
    desired: ModuleState,
    current_heading: f32,
) -> ModuleState {
    optimize_with(desired, current_heading, FlipPolicy::default())
}

/// Minimise steering rotation, reversing the drive when that is shorter.
///
/// Returns `desired` untouched unless the shortest rotation onto it exceeds a
/// quarter turn, in which case the heading is turned by π and the speed negated.
pub fn optimize_with(
    desired: ModuleState,
    current_heading: f32,
    policy: FlipPolicy,
) -> ModuleState {
    let delta = shortest_error(desired.heading, current_heading);
    if policy.should_flip(delta) {
        ModuleState {
            speed: -desired.speed,
            heading: wrap_to_signed_range(desired.heading + PI),
        }
    } else {
        desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::angle::degrees_to_radians;

    #[test]
    fn test_optimize_no_flip_across_seam() {
        let desired = ModuleState::new(1.5, degrees_to_radians(170.0));
        let out = optimize(desired, degrees_to_radians(-170.0));
        assert_eq!(out, desired);
    }

    #[test]
    fn test_optimize_flips_past_quarter_turn() {
        let desired = ModuleState::new(1.5, degrees_to_radians(100.0));
        let out = optimize(desired, 0.0);
        assert!((out.heading - degrees_to_radians(-80.0)).abs() < 1e-5);
        assert_eq!(out.speed, -1.5);
    }

    #[test]
    fn test_optimize_flip_wraps_heading() {
        let desired = ModuleState::new(-0.5, degrees_to_radians(-135.0));
        let out = optimize(desired, degrees_to_radians(10.0));
        assert!((out.heading - degrees_to_radians(45.0)).abs() < 1e-5);
        assert_eq!(out.speed, 0.5);
    }

    #[test]
    fn test_quarter_turn_tie_break_default_keeps() {
        let desired = ModuleState::new(1.0, FRAC_PI_2);
        let out = optimize(desired, 0.0);
        assert_eq!(out, desired);
    }

    #[test]
    fn test_quarter_turn_tie_break_flip_policy() {
        let desired = ModuleState::new(1.0, FRAC_PI_2);
        let out = optimize_with(desired, 0.0, FlipPolicy::FlipAtQuarterTurn);
        assert!((out.heading + FRAC_PI_2).abs() < 1e-6);
        assert_eq!(out.speed, -1.0);
    }

    #[test]
    fn test_zero_speed_still_optimizes_heading() {
        let desired = ModuleState::new(0.0, PI);
        let out = optimize(desired, 0.0);
        assert!(out.heading.abs() < 1e-6);
    }
}
