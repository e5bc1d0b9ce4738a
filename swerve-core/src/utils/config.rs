//! Per-module configuration.
//!
//! Everything the control core needs is supplied once at construction:
//! steering gains and limits, the tick period, the encoder offset and the
//! drive unit conversion. Missing JSON fields fall back to [`Default`].

use core::{f32::consts::PI, fmt};

use serde::{Deserialize, Serialize};

use crate::utils::{
    controllers::{
        calibration::EncoderCalibration,
        drive::DriveVelocityConverter,
        turn::TurnController,
    },
    math::{pid::PidGains, profile::TrapezoidProfile, state::FlipPolicy},
};

/// Wheel diameter of the default module (m).
const WHEEL_DIAMETER: f32 = 0.1016;
/// Drive reduction of the default module.
const DRIVE_GEAR_RATIO: f32 = 6.75;
/// Integrated encoder counts per motor revolution.
const ENCODER_CPR: f32 = 2048.0;

/// Construction-time configuration of one swerve module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Turn feed-forward on profiled angular velocity.
    pub kv: f32,
    /// rad/s
    pub max_angular_velocity: f32,
    /// rad/s²
    pub max_angular_acceleration: f32,
    /// Control tick period (s).
    pub period_s: f32,
    /// Raw sensor reading at the wheel's mechanical zero (deg).
    pub calibration_offset_deg: f32,
    pub distance_per_native_unit: f32,
    pub native_time_scale: f32,
    pub flip_policy: FlipPolicy,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            kv: 0.0,
            max_angular_velocity: 2.0 * PI,
            max_angular_acceleration: 2.0 * PI,
            period_s: 0.02,
            calibration_offset_deg: 0.0,
            distance_per_native_unit: WHEEL_DIAMETER * PI / (ENCODER_CPR * DRIVE_GEAR_RATIO),
            native_time_scale: 10.0,
            flip_policy: FlipPolicy::default(),
        }
    }
}

/// Errors raised while loading a [`ModuleConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "invalid module config: {}", e),
        }
    }
}

impl core::error::Error for ConfigError {}

impl ModuleConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        if config.kp == 0.0 && config.ki == 0.0 && config.kd == 0.0 {
            tracing::warn!("turn gains are all zero; steering will not correct");
        }
        Ok(config)
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    pub fn profile(&self) -> TrapezoidProfile {
        TrapezoidProfile::new(self.max_angular_velocity, self.max_angular_acceleration)
    }

    pub fn turn_controller(&self) -> TurnController {
        TurnController::new(self.gains(), self.profile(), self.period_s).with_feedforward(self.kv)
    }

    pub fn drive_converter(&self) -> DriveVelocityConverter {
        DriveVelocityConverter::new(self.distance_per_native_unit, self.native_time_scale)
    }

    pub fn calibration(&self) -> EncoderCalibration {
        EncoderCalibration::from_degrees(self.calibration_offset_deg)
    }
}
