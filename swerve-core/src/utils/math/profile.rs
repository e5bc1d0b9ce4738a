//! Trapezoidal motion profile.
//!
//! Given the previous profiled setpoint and a goal, [`TrapezoidProfile::calculate`]
//! returns where the setpoint should be one step later so that velocity never
//! exceeds `max_velocity`, velocity never changes faster than
//! `max_acceleration`, and motion ends at rest exactly on the goal.

use serde::{Deserialize, Serialize};

/// Position and velocity of a profiled setpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileState {
    pub position: f32,
    pub velocity: f32,
}

impl ProfileState {
    pub fn new(
        position: f32,
        velocity: f32,
    ) -> Self {
        Self { position, velocity }
    }

    /// A state holding still at `position`.
    pub fn at_rest(position: f32) -> Self {
        Self {
            position,
            velocity: 0.0,
        }
    }

    fn mirrored(
        self,
        sign: f32,
    ) -> Self {
        Self {
            position: self.position * sign,
            velocity: self.velocity * sign,
        }
    }
}

/// Velocity and acceleration limits of a trapezoidal profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidProfile {
    pub max_velocity: f32,
    pub max_acceleration: f32,
}

impl TrapezoidProfile {
    pub fn new(
        max_velocity: f32,
        max_acceleration: f32,
    ) -> Self {
        Self {
            max_velocity,
            max_acceleration,
        }
    }

    /// Whether both limits are positive and finite.
    ///
    /// A profile with unusable limits does not shape motion at all.
    pub fn is_constrained(&self) -> bool {
        self.max_velocity.is_finite()
            && self.max_acceleration.is_finite()
            && self.max_velocity > 0.0
            && self.max_acceleration > 0.0
    }

    /// Advance `current` by `dt` seconds toward `goal`.
    pub fn calculate(
        &self,
        dt: f32,
        current: ProfileState,
        goal: ProfileState,
    ) -> ProfileState {
        if !self.is_constrained() {
            return goal;
        }

        // Solve every profile as if it moves in the positive direction.
        let sign = if current.position > goal.position {
            -1.0
        } else {
            1.0
        };
        let mut current = current.mirrored(sign);
        let goal = goal.mirrored(sign);

        let max_v = self.max_velocity;
        let max_a = self.max_acceleration;

        if current.velocity > max_v {
            current.velocity = max_v;
        }

        let cutoff_begin = current.velocity / max_a;
        let cutoff_dist_begin = cutoff_begin * cutoff_begin * max_a / 2.0;
        let cutoff_end = goal.velocity / max_a;
        let cutoff_dist_end = cutoff_end * cutoff_end * max_a / 2.0;

        // Distance of the full trapezoid that starts and ends at rest.
        let full_trapezoid_dist =
            cutoff_dist_begin + (goal.position - current.position) + cutoff_dist_end;
        let mut accel_time = max_v / max_a;
        let mut full_speed_dist = full_trapezoid_dist - accel_time * accel_time * max_a;

        // Triangular profile: top speed is never reached.
        if full_speed_dist < 0.0 {
            accel_time = libm::sqrtf(full_trapezoid_dist / max_a);
            full_speed_dist = 0.0;
        }

        let end_accel = accel_time - cutoff_begin;
        let end_full_speed = end_accel + full_speed_dist / max_v;
        let end_decel = end_full_speed + accel_time - cutoff_end;

        // Moving too fast to stop on the goal: brake at the limit. The profile
        // overshoots and is re-planned from the far side on a later tick.
        // Below one tick of braking the goal itself is within reach.
        let next = if end_accel < 0.0 && current.velocity > dt * max_a {
            ProfileState {
                position: current.position + (current.velocity - dt * max_a / 2.0) * dt,
                velocity: current.velocity - dt * max_a,
            }
        } else if dt < end_accel {
            ProfileState {
                position: current.position + (current.velocity + dt * max_a / 2.0) * dt,
                velocity: current.velocity + dt * max_a,
            }
        } else if dt < end_full_speed {
            ProfileState {
                position: current.position
                    + (current.velocity + end_accel * max_a / 2.0) * end_accel
                    + max_v * (dt - end_accel),
                velocity: max_v,
            }
        } else if dt <= end_decel {
            let time_left = end_decel - dt;
            ProfileState {
                position: goal.position - (goal.velocity + time_left * max_a / 2.0) * time_left,
                velocity: goal.velocity + time_left * max_a,
            }
        } else {
            goal
        };

        next.mirrored(sign)
    }
}
