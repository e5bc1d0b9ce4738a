//! Per-wheel swerve module controller.
//!
//! Composes calibration, steering optimization, the profiled turn controller
//! and drive conversion into the per-tick contract: read state, read position,
//! command a desired state, reset encoders.

use core::fmt;

use crate::utils::{
    config::ModuleConfig,
    controllers::{
        calibration::EncoderCalibration,
        drive::DriveVelocityConverter,
        hardware::{AbsoluteAngleSensor, DriveActuator, TurnActuator},
        turn::{ProfiledTurnController, TurnController, TurnControllerState},
        CommandReply, ModuleCommand,
    },
    math::{
        angle::degrees_to_radians,
        state::{optimize_with, ActuatorCommand, FlipPolicy, ModulePosition, ModuleState},
    },
};

/// Errors that can occur when talking to a module's hardware.
#[derive(Debug)]
pub enum ModuleError<D, T, S> {
    Drive(D),
    Turn(T),
    Sensor(S),
}

impl<D, T, S> fmt::Display for ModuleError<D, T, S>
where
    D: fmt::Debug,
    T: fmt::Debug,
    S: fmt::Debug,
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ModuleError::Drive(e) => write!(f, "drive actuator error: {:?}", e),
            ModuleError::Turn(e) => write!(f, "turn actuator error: {:?}", e),
            ModuleError::Sensor(e) => write!(f, "angle sensor error: {:?}", e),
        }
    }
}

impl<D, T, S> core::error::Error for ModuleError<D, T, S>
where
    D: fmt::Debug,
    T: fmt::Debug,
    S: fmt::Debug,
{
}

/// [`ModuleError`] for a given set of hardware.
pub type ErrorOf<D, T, S> = ModuleError<
    <D as DriveActuator>::Error,
    <T as TurnActuator>::Error,
    <S as AbsoluteAngleSensor>::Error,
>;

/// One physical swerve module: drive motor, turn motor and absolute sensor.
pub struct ModuleController<D, T, S> {
    drive: D,
    turn: T,
    sensor: S,
    converter: DriveVelocityConverter,
    calibration: EncoderCalibration,
    turn_controller: ProfiledTurnController,
    flip_policy: FlipPolicy,
}

impl<D, T, S> ModuleController<D, T, S>
where
    D: DriveActuator,
    T: TurnActuator,
    S: AbsoluteAngleSensor,
{
    /// Build a module from its hardware and configuration.
    ///
    /// The turn profile starts at rest on heading 0 whatever the wheel's real
    /// heading is, so the first ticks steer toward 0. Call
    /// [`reset_turn_controller`](Self::reset_turn_controller) once the sensor
    /// is readable to start from the measured heading instead.
    pub fn new(
        drive: D,
        turn: T,
        sensor: S,
        config: &ModuleConfig,
    ) -> Self {
        Self::from_parts(
            drive,
            turn,
            sensor,
            config.drive_converter(),
            config.calibration(),
            config.turn_controller(),
        )
        .with_flip_policy(config.flip_policy)
    }

    /// Build a module from already-constructed control pieces.
    pub fn from_parts(
        drive: D,
        turn: T,
        sensor: S,
        converter: DriveVelocityConverter,
        calibration: EncoderCalibration,
        turn_controller: TurnController,
    ) -> Self {
        Self {
            drive,
            turn,
            sensor,
            converter,
            calibration,
            turn_controller: ProfiledTurnController::new(turn_controller),
            flip_policy: FlipPolicy::default(),
        }
    }

    pub fn with_flip_policy(
        mut self,
        policy: FlipPolicy,
    ) -> Self {
        self.flip_policy = policy;
        self
    }

    /// Calibrated wheel heading (rad) from the live sensor reading.
    pub fn heading(&mut self) -> Result<f32, ErrorOf<D, T, S>> {
        let raw = self
            .sensor
            .read_absolute_degrees()
            .map_err(ModuleError::Sensor)?;
        Ok(self.calibration.calibrated_heading(raw))
    }

    /// Measured wheel speed and heading.
    pub fn get_state(&mut self) -> Result<ModuleState, ErrorOf<D, T, S>> {
        let native = self.drive.read_velocity().map_err(ModuleError::Drive)?;
        let heading = self.heading()?;
        Ok(ModuleState::new(
            self.converter.from_native_reading(native),
            heading,
        ))
    }

    /// Accumulated wheel distance and heading.
    pub fn get_position(&mut self) -> Result<ModulePosition, ErrorOf<D, T, S>> {
        let native = self.drive.read_position().map_err(ModuleError::Drive)?;
        let heading = self.heading()?;
        Ok(ModulePosition {
            distance: self.converter.native_position_to_distance(native),
            heading,
        })
    }

    /// Drive the wheel toward `desired` for this tick.
    ///
    /// Returns the command that was written to the actuators.
    pub fn set_desired_state(
        &mut self,
        desired: ModuleState,
    ) -> Result<ActuatorCommand, ErrorOf<D, T, S>> {
        let heading = self.heading()?;
        let state = optimize_with(desired, heading, self.flip_policy);
        if state != desired {
            tracing::debug!(
                requested = desired.heading,
                optimized = state.heading,
                "wheel flipped, reversing drive"
            );
        }

        let command = ActuatorCommand {
            drive_setpoint: self.converter.to_native_setpoint(state.speed),
            turn_output: self.turn_controller.update(heading, state.heading),
        };
        self.write(command)?;
        Ok(command)
    }

    /// Zero drive velocity and turn output; the turn goal is left untouched.
    pub fn stop(&mut self) -> Result<(), ErrorOf<D, T, S>> {
        self.write(ActuatorCommand::default())
    }

    /// Zero the drive, turn and sensor position counters.
    ///
    /// The calibration offset is a separate constant and is not affected.
    pub fn reset_encoders(&mut self) -> Result<(), ErrorOf<D, T, S>> {
        self.drive.reset_position().map_err(ModuleError::Drive)?;
        self.turn.reset_position().map_err(ModuleError::Turn)?;
        self.sensor.reset_position().map_err(ModuleError::Sensor)?;
        tracing::info!("module encoders reset");
        Ok(())
    }

    /// Restart the steering profile from the wheel's current heading.
    pub fn reset_turn_controller(&mut self) -> Result<(), ErrorOf<D, T, S>> {
        let heading = self.heading()?;
        self.turn_controller.reset(heading);
        Ok(())
    }

    /// Execute a [`ModuleCommand`], returning any data it reads back.
    pub fn execute_command(
        &mut self,
        command: ModuleCommand,
    ) -> Result<CommandReply, ErrorOf<D, T, S>> {
        match command {
            ModuleCommand::Set { s, h } => {
                let desired = ModuleState::new(s, degrees_to_radians(h));
                Ok(CommandReply::Applied(self.set_desired_state(desired)?))
            }
            ModuleCommand::Stop => {
                self.stop()?;
                Ok(CommandReply::Done)
            }
            ModuleCommand::ResetEncoders => {
                self.reset_encoders()?;
                Ok(CommandReply::Done)
            }
            ModuleCommand::ResetTurn => {
                self.reset_turn_controller()?;
                Ok(CommandReply::Done)
            }
            ModuleCommand::ReadState => Ok(CommandReply::State(self.get_state()?)),
            ModuleCommand::ReadPosition => Ok(CommandReply::Position(self.get_position()?)),
        }
    }

    pub fn turn_state(&self) -> &TurnControllerState {
        self.turn_controller.state()
    }

    pub fn calibration(&self) -> EncoderCalibration {
        self.calibration
    }

    pub fn converter(&self) -> DriveVelocityConverter {
        self.converter
    }

    pub fn drive_mut(&mut self) -> &mut D {
        &mut self.drive
    }

    pub fn turn_mut(&mut self) -> &mut T {
        &mut self.turn
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Give the hardware back.
    pub fn release(self) -> (D, T, S) {
        (self.drive, self.turn, self.sensor)
    }

    fn write(
        &mut self,
        command: ActuatorCommand,
    ) -> Result<(), ErrorOf<D, T, S>> {
        self.drive
            .write_velocity_setpoint(command.drive_setpoint)
            .map_err(ModuleError::Drive)?;
        self.turn
            .write_output_fraction(command.turn_output)
            .map_err(ModuleError::Turn)?;
        tracing::trace!(
            drive = command.drive_setpoint,
            turn = command.turn_output,
            "actuator command issued"
        );
        Ok(())
    }
}
