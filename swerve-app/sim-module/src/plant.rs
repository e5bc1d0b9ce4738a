//! Simulated swerve module hardware.
//!
//! A single `WheelPlant` holds the physical state; the drive motor, turn
//! motor and absolute sensor are thin handles sharing it through a `RefCell`,
//! the same way real devices share one bus.

use core::cell::RefCell;
use std::{convert::Infallible, rc::Rc};

use swerve_core::utils::controllers::hardware::{AbsoluteAngleSensor, DriveActuator, TurnActuator};
use swerve_core::utils::math::angle::radians_to_degrees;

/// Physical parameters of the simulated module.
#[derive(Debug, Clone, Copy)]
pub struct PlantParams {
    /// Steering rate at full output (rad/s).
    pub turn_rate: f32,
    /// Drive velocity loop time constant (s).
    pub drive_time_constant: f32,
    /// Native velocity windows per second, matching the module config.
    pub native_time_scale: f32,
    /// Raw sensor reading at mechanical zero (deg).
    pub mount_offset_deg: f32,
}

/// Physical state of the wheel.
#[derive(Debug)]
pub struct WheelPlant {
    params: PlantParams,
    /// Mechanical steering angle, unwrapped (rad).
    angle: f32,
    turn_output: f32,
    drive_setpoint: f32,
    /// Native units per native window.
    drive_velocity: f32,
    /// Native units.
    drive_position: f32,
}

impl WheelPlant {
    pub fn new(
        params: PlantParams,
        angle: f32,
    ) -> Self {
        Self {
            params,
            angle,
            turn_output: 0.0,
            drive_setpoint: 0.0,
            drive_velocity: 0.0,
            drive_position: 0.0,
        }
    }

    /// Advance the physics by `dt` seconds using the last commands.
    pub fn step(
        &mut self,
        dt: f32,
    ) {
        self.angle += self.turn_output * self.params.turn_rate * dt;
        let alpha = dt / (self.params.drive_time_constant + dt);
        self.drive_velocity += (self.drive_setpoint - self.drive_velocity) * alpha;
        self.drive_position += self.drive_velocity * self.params.native_time_scale * dt;
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    fn raw_degrees(&self) -> f32 {
        let deg = radians_to_degrees(self.angle) + self.params.mount_offset_deg;
        deg.rem_euclid(360.0)
    }
}

pub type SharedPlant = Rc<RefCell<WheelPlant>>;

pub struct SimDrive(pub SharedPlant);
pub struct SimTurn(pub SharedPlant);
pub struct SimSensor(pub SharedPlant);

impl DriveActuator for SimDrive {
    type Error = Infallible;

    fn write_velocity_setpoint(
        &mut self,
        native: f32,
    ) -> Result<(), Self::Error> {
        self.0.borrow_mut().drive_setpoint = native;
        Ok(())
    }

    fn read_position(&mut self) -> Result<f32, Self::Error> {
        Ok(self.0.borrow().drive_position)
    }

    fn read_velocity(&mut self) -> Result<f32, Self::Error> {
        Ok(self.0.borrow().drive_velocity)
    }

    fn reset_position(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().drive_position = 0.0;
        Ok(())
    }
}

impl TurnActuator for SimTurn {
    type Error = Infallible;

    fn write_output_fraction(
        &mut self,
        value: f32,
    ) -> Result<(), Self::Error> {
        self.0.borrow_mut().turn_output = value.clamp(-1.0, 1.0);
        Ok(())
    }
}

impl AbsoluteAngleSensor for SimSensor {
    type Error = Infallible;

    fn read_absolute_degrees(&mut self) -> Result<f32, Self::Error> {
        Ok(self.0.borrow().raw_degrees())
    }

    fn reset_position(&mut self) -> Result<(), Self::Error> {
        // Absolute readings are unaffected by a counter reset.
        Ok(())
    }
}
