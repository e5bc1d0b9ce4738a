//! A simple discrete PID controller with optional circular input.
//!
//! The controller itself only holds gains; the per-tick memory lives in
//! [`PidState`] so callers decide who owns it.

use serde::{Deserialize, Serialize};

use super::angle::shortest_error;

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    pub fn new(
        kp: f32,
        ki: f32,
        kd: f32,
    ) -> Self {
        Self { kp, ki, kd }
    }
}

/// Integrator and derivative history carried between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    pub integral: f32,
    pub prev_error: f32,
    /// False until the first error has been seen; suppresses derivative kick.
    pub primed: bool,
}

/// Discrete PID over a fixed period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidController {
    gains: PidGains,
    dt: f32,
    /// Largest magnitude `ki * integral` may reach.
    integral_limit: f32,
    /// Treat the measurement as an angle on (−π, π].
    continuous: bool,
}

impl PidController {
    pub fn new(
        gains: PidGains,
        dt: f32,
    ) -> Self {
        Self {
            gains,
            dt,
            integral_limit: 1.0,
            continuous: false,
        }
    }

    /// Compute errors with wrap-around so ±π are neighbours.
    pub fn with_continuous_input(mut self) -> Self {
        self.continuous = true;
        self
    }

    pub fn with_integral_limit(
        mut self,
        limit: f32,
    ) -> Self {
        self.integral_limit = limit;
        self
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn period(&self) -> f32 {
        self.dt
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Error between `setpoint` and `measurement` as this controller sees it.
    pub fn error(
        &self,
        measurement: f32,
        setpoint: f32,
    ) -> f32 {
        if self.continuous {
            shortest_error(setpoint, measurement)
        } else {
            setpoint - measurement
        }
    }

    /// Compute control output for one tick, returning the updated memory.
    pub fn compute(
        &self,
        state: PidState,
        measurement: f32,
        setpoint: f32,
    ) -> (f32, PidState) {
        let error = self.error(measurement, setpoint);
        let PidGains { kp, ki, kd } = self.gains;

        let mut integral = state.integral;
        if ki != 0.0 {
            let bound = libm::fabsf(self.integral_limit / ki);
            integral = (integral + error * self.dt).clamp(-bound, bound);
        }

        let derivative = if state.primed && self.dt > 0.0 {
            let delta = if self.continuous {
                shortest_error(error, state.prev_error)
            } else {
                error - state.prev_error
            };
            delta / self.dt
        } else {
            0.0
        };

        let output = kp * error + ki * integral + kd * derivative;
        let next = PidState {
            integral,
            prev_error: error,
            primed: true,
        };
        (output, next)
    }
}
