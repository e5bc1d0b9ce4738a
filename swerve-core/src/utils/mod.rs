//! Utility re-exports for the swerve module core.
//!
//! - `config`: construction-time module configuration
//! - `controllers`: calibration, drive conversion, steering control and the
//!   `ModuleController` that composes them over hardware traits
//! - `math`: angle wrapping, wheel state optimization, motion profile and PID

pub mod config;
pub mod controllers;
pub mod math;

pub use config::ModuleConfig;
pub use controllers::{ModuleCommand, ModuleController};
pub use math::state::{ActuatorCommand, ModulePosition, ModuleState};
