//! Absolute encoder calibration.
//!
//! The absolute sensor reports degrees in [0, 360). The offset recorded when
//! the module was zeroed is the raw reading at the wheel's mechanical zero;
//! subtracting it and wrapping gives the module-relative heading.

use serde::{Deserialize, Serialize};

use crate::utils::math::angle::{degrees_to_radians, wrap_to_signed_range};

/// Fixed raw-to-module heading transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderCalibration {
    /// Raw reading (rad) that corresponds to heading zero.
    offset: f32,
}

impl EncoderCalibration {
    pub fn from_radians(offset: f32) -> Self {
        Self { offset }
    }

    pub fn from_degrees(offset_deg: f32) -> Self {
        Self::from_radians(degrees_to_radians(offset_deg))
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Module heading (rad, (−π, π]) for a raw sensor reading in degrees.
    ///
    /// Out-of-range or non-finite readings are not validated.
    pub fn calibrated_heading(
        &self,
        raw_degrees: f32,
    ) -> f32 {
        wrap_to_signed_range(degrees_to_radians(raw_degrees) - self.offset)
    }
}
