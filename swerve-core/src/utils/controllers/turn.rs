//! Motion-profiled steering controller.
//!
//! Each tick the goal heading and the previous profiled setpoint are
//! re-expressed next to the measured heading, so a goal at +π and a wheel at
//! −π are neighbours. The setpoint then advances along a trapezoidal profile
//! and a continuous-input PID tracks it. The output is an actuator fraction
//! clamped to [−1, 1].
//!
//! [`TurnController`] is the pure control law; it takes a
//! [`TurnControllerState`] and hands back the next one. [`ProfiledTurnController`]
//! bundles the two for callers that just want `update`.

use serde::{Deserialize, Serialize};

use crate::utils::math::{
    angle::{shortest_error, wrap_to_signed_range},
    pid::{PidController, PidGains, PidState},
    profile::{ProfileState, TrapezoidProfile},
};

/// Lower and upper bound of the turn output.
pub const OUTPUT_LIMIT: f32 = 1.0;

/// Memory of one module's turn controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnControllerState {
    /// Profiled setpoint reached on the last tick (heading in (−π, π]).
    pub setpoint: ProfileState,
    /// Goal the profile was heading to on the last tick. Kept for reporting;
    /// `compute` takes the goal afresh every tick.
    pub goal: ProfileState,
    pub pid: PidState,
}

impl TurnControllerState {
    /// State for a wheel sitting still at `heading`.
    pub fn at_rest(heading: f32) -> Self {
        let heading = wrap_to_signed_range(heading);
        Self {
            setpoint: ProfileState::at_rest(heading),
            goal: ProfileState::at_rest(heading),
            pid: PidState::default(),
        }
    }
}

/// Steering control law: trapezoidal profile feeding a circular PID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnController {
    pid: PidController,
    profile: TrapezoidProfile,
    /// Feed-forward gain on the profiled angular velocity (output per rad/s).
    kv: f32,
}

impl TurnController {
    pub fn new(
        gains: PidGains,
        profile: TrapezoidProfile,
        period: f32,
    ) -> Self {
        Self {
            pid: PidController::new(gains, period)
                .with_continuous_input()
                .with_integral_limit(OUTPUT_LIMIT),
            profile,
            kv: 0.0,
        }
    }

    pub fn with_feedforward(
        mut self,
        kv: f32,
    ) -> Self {
        self.kv = kv;
        self
    }

    pub fn gains(&self) -> PidGains {
        self.pid.gains()
    }

    pub fn profile(&self) -> TrapezoidProfile {
        self.profile
    }

    pub fn period(&self) -> f32 {
        self.pid.period()
    }

    /// Run one tick of the control law.
    ///
    /// `current` and `goal` are headings in radians. Returns the clamped
    /// output together with the state to feed into the next tick.
    pub fn compute(
        &self,
        state: &TurnControllerState,
        current: f32,
        goal: f32,
    ) -> (f32, TurnControllerState) {
        // Unwrap goal and setpoint so both sit within π of the measurement.
        let goal = ProfileState::at_rest(current + shortest_error(goal, current));
        let setpoint = ProfileState::new(
            current + shortest_error(state.setpoint.position, current),
            state.setpoint.velocity,
        );

        let setpoint = self.profile.calculate(self.period(), setpoint, goal);
        let (correction, pid) = self.pid.compute(state.pid, current, setpoint.position);
        let output =
            (self.kv * setpoint.velocity + correction).clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);

        let next = TurnControllerState {
            setpoint: ProfileState::new(wrap_to_signed_range(setpoint.position), setpoint.velocity),
            goal: ProfileState::at_rest(wrap_to_signed_range(goal.position)),
            pid,
        };
        (output, next)
    }
}

/// A [`TurnController`] that owns its state, one per module.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfiledTurnController {
    controller: TurnController,
    state: TurnControllerState,
}

impl ProfiledTurnController {
    /// Start at rest on heading zero.
    pub fn new(controller: TurnController) -> Self {
        Self {
            controller,
            state: TurnControllerState::default(),
        }
    }

    /// Compute the turn output for this tick and remember the new state.
    pub fn update(
        &mut self,
        current: f32,
        goal: f32,
    ) -> f32 {
        let (output, next) = self.controller.compute(&self.state, current, goal);
        self.state = next;
        output
    }

    /// Collapse the profile onto `measurement` and forget PID history.
    pub fn reset(
        &mut self,
        measurement: f32,
    ) {
        self.state = TurnControllerState::at_rest(measurement);
    }

    pub fn state(&self) -> &TurnControllerState {
        &self.state
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }
}
