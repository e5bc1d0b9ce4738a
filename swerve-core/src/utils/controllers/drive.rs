//! Drive velocity conversion.
//!
//! The drive motor's closed loop works in native encoder units per native
//! time window (e.g. counts per 100 ms). This converter maps linear wheel
//! speeds into that space and back.

use serde::{Deserialize, Serialize};

/// Linear speed ⇄ native drive units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveVelocityConverter {
    /// Wheel travel per native encoder unit (m).
    pub distance_per_native_unit: f32,
    /// Native velocity windows per second (10.0 for counts per 100 ms).
    pub native_time_scale: f32,
}

impl DriveVelocityConverter {
    pub fn new(
        distance_per_native_unit: f32,
        native_time_scale: f32,
    ) -> Self {
        Self {
            distance_per_native_unit,
            native_time_scale,
        }
    }

    fn speed_per_native(&self) -> f32 {
        self.distance_per_native_unit * self.native_time_scale
    }

    /// Speed (m/s) to a native velocity setpoint.
    ///
    /// Non-finite speeds pass straight through to the setpoint.
    pub fn to_native_setpoint(
        &self,
        speed: f32,
    ) -> f32 {
        speed / self.speed_per_native()
    }

    /// Native velocity reading to speed (m/s); inverse of [`Self::to_native_setpoint`].
    pub fn from_native_reading(
        &self,
        native: f32,
    ) -> f32 {
        native * self.speed_per_native()
    }

    /// Native position reading to accumulated distance (m).
    pub fn native_position_to_distance(
        &self,
        native: f32,
    ) -> f32 {
        native * self.distance_per_native_unit
    }
}
