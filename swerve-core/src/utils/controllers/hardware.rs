//! Hardware capabilities consumed by the module controller.
//!
//! The controller never names a concrete motor controller or sensor; it only
//! needs the read/write primitives below. Real devices, bus drivers and
//! simulated plants all plug in through these traits.
//!
//! [`HBridgeTurnActuator`] drives a brushed steering motor through a PWM
//! enable channel and a phase pin using `embedded-hal` 1.0 traits.

use embedded_hal::{digital::OutputPin, pwm::SetDutyCycle};

/// Drive motor with an onboard velocity loop.
pub trait DriveActuator {
    type Error: core::fmt::Debug;

    /// Command a velocity setpoint in native units.
    fn write_velocity_setpoint(
        &mut self,
        native: f32,
    ) -> Result<(), Self::Error>;

    /// Accumulated position in native units.
    fn read_position(&mut self) -> Result<f32, Self::Error>;

    /// Velocity in native units.
    fn read_velocity(&mut self) -> Result<f32, Self::Error>;

    fn reset_position(&mut self) -> Result<(), Self::Error>;
}

/// Steering motor driven open-loop by an output fraction.
pub trait TurnActuator {
    type Error: core::fmt::Debug;

    /// Apply `value` in [−1, 1]; the sign selects direction.
    fn write_output_fraction(
        &mut self,
        value: f32,
    ) -> Result<(), Self::Error>;

    /// Zero the motor's integrated position counter, if it has one.
    fn reset_position(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Absolute steering angle sensor.
pub trait AbsoluteAngleSensor {
    type Error: core::fmt::Debug;

    /// Absolute wheel angle in degrees, [0, 360).
    fn read_absolute_degrees(&mut self) -> Result<f32, Self::Error>;

    /// Zero the sensor's relative position counter.
    fn reset_position(&mut self) -> Result<(), Self::Error>;
}

/// Errors raised by [`HBridgeTurnActuator`].
#[derive(Debug)]
pub enum HBridgeError<P: core::fmt::Debug, D: core::fmt::Debug> {
    Pwm(P),
    Phase(D),
}

/// Steering motor on an H-bridge: PWM magnitude plus a direction pin.
pub struct HBridgeTurnActuator<P, D> {
    enable: P,
    phase: D,
    inverted: bool,
}

impl<P, D> HBridgeTurnActuator<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    pub fn new(
        enable: P,
        phase: D,
    ) -> Self {
        Self {
            enable,
            phase,
            inverted: false,
        }
    }

    /// Swap the motor's positive direction.
    pub fn inverted(
        mut self,
        inverted: bool,
    ) -> Self {
        self.inverted = inverted;
        self
    }

    /// Release the PWM channel and phase pin.
    pub fn release(self) -> (P, D) {
        (self.enable, self.phase)
    }
}

impl<P, D> TurnActuator for HBridgeTurnActuator<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    type Error = HBridgeError<P::Error, D::Error>;

    fn write_output_fraction(
        &mut self,
        value: f32,
    ) -> Result<(), Self::Error> {
        let value = if self.inverted { -value } else { value };
        let forward = value >= 0.0;
        // NaN clamps to NaN, which casts to a zero duty cycle.
        let magnitude = libm::fabsf(value).clamp(0.0, 1.0);
        let duty = (magnitude * self.enable.max_duty_cycle() as f32) as u16;

        if forward {
            self.phase.set_low().map_err(HBridgeError::Phase)?;
        } else {
            self.phase.set_high().map_err(HBridgeError::Phase)?;
        }
        self.enable
            .set_duty_cycle(duty)
            .map_err(HBridgeError::Pwm)?;
        tracing::trace!(value, duty, forward, "turn output applied");
        Ok(())
    }
}
