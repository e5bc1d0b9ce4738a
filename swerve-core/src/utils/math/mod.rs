//! Math utilities for the swerve module.
//!
//! This module provides the pure numeric pieces of the control loop:
//! circular angle arithmetic, wheel state optimization, the trapezoidal
//! motion profile and a discrete PID.

pub mod angle;
pub mod pid;
pub mod profile;
pub mod state;
