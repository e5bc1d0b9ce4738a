//! Per-wheel control core for swerve drive modules on no-std embedded platforms.
//!
//! For a runnable simulation, see the `sim-module` app in `swerve-app/`.
#![no_std]

#[cfg(test)]
extern crate std;

pub mod utils;
