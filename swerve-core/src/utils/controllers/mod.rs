//! Module Exports
//!
//! This file exports the control pieces that act on a swerve module.
//!
//! - `calibration`: absolute encoder to module heading.
//! - `drive`: linear speed to drive-controller native units.
//! - `hardware`: actuator and sensor capability traits.
//! - `module`: the per-wheel `ModuleController`.
//! - `turn`: motion-profiled steering controller.

pub mod calibration;
pub mod drive;
pub mod hardware;
pub mod module;
pub mod turn;

use serde::{Deserialize, Serialize};

use crate::utils::math::state::{ActuatorCommand, ModulePosition, ModuleState};

pub use module::{ErrorOf, ModuleController, ModuleError};

/// Commands accepted by a module.
///
/// Serialized as JSON with tag `"mc"`; headings are in degrees.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "mc", rename_all = "snake_case")] // mc = module command
pub enum ModuleCommand {
    /// Drive at speed `s` (m/s) with wheel heading `h` (deg).
    Set { s: f32, h: f32 },
    /// Zero drive velocity and turn output.
    Stop,
    /// Zero all position counters.
    ResetEncoders,
    /// Restart the steering profile from the current heading.
    ResetTurn,
    ReadState,
    ReadPosition,
}

impl ModuleCommand {
    /// Parse a single JSON command.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Data returned by an executed [`ModuleCommand`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "r", rename_all = "snake_case")]
pub enum CommandReply {
    Applied(ActuatorCommand),
    State(ModuleState),
    Position(ModulePosition),
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_command() {
        let cmd = ModuleCommand::from_json(r#"{"mc":"set","s":1.5,"h":-45.0}"#).unwrap();
        assert_eq!(cmd, ModuleCommand::Set { s: 1.5, h: -45.0 });
    }

    #[test]
    fn test_parse_unit_commands() {
        assert_eq!(
            ModuleCommand::from_json(r#"{"mc":"reset_encoders"}"#).unwrap(),
            ModuleCommand::ResetEncoders
        );
        assert_eq!(
            ModuleCommand::from_json(r#"{"mc":"stop"}"#).unwrap(),
            ModuleCommand::Stop
        );
    }

    #[test]
    fn test_reject_unknown_command() {
        assert!(ModuleCommand::from_json(r#"{"mc":"spin"}"#).is_err());
    }
}
