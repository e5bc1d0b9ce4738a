use std::{cell::Cell, f32::consts::PI, rc::Rc};

use swerve_core::utils::{
    controllers::{
        hardware::{AbsoluteAngleSensor, DriveActuator, TurnActuator},
        CommandReply, ModuleCommand, ModuleController, ModuleError,
    },
    math::{
        angle::{degrees_to_radians, radians_to_degrees, shortest_error},
        state::FlipPolicy,
    },
    ModuleConfig, ModuleState,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct BusFault;

/// Drive motor that remembers what it was told.
#[derive(Default)]
struct FakeDrive {
    setpoint: Option<f32>,
    position: f32,
    velocity: f32,
    resets: u32,
}

impl DriveActuator for FakeDrive {
    type Error = BusFault;

    fn write_velocity_setpoint(
        &mut self,
        native: f32,
    ) -> Result<(), Self::Error> {
        self.setpoint = Some(native);
        Ok(())
    }

    fn read_position(&mut self) -> Result<f32, Self::Error> {
        Ok(self.position)
    }

    fn read_velocity(&mut self) -> Result<f32, Self::Error> {
        Ok(self.velocity)
    }

    fn reset_position(&mut self) -> Result<(), Self::Error> {
        self.position = 0.0;
        self.resets += 1;
        Ok(())
    }
}

/// Turn motor whose output moves a shared wheel angle (rad per tick per unit).
struct FakeTurn {
    output: Option<f32>,
    wheel: Rc<Cell<f32>>,
    gain: f32,
    resets: u32,
}

impl TurnActuator for FakeTurn {
    type Error = BusFault;

    fn write_output_fraction(
        &mut self,
        value: f32,
    ) -> Result<(), Self::Error> {
        self.output = Some(value);
        self.wheel.set(self.wheel.get() + value * self.gain);
        Ok(())
    }

    fn reset_position(&mut self) -> Result<(), Self::Error> {
        self.resets += 1;
        Ok(())
    }
}

/// Absolute sensor reading the shared wheel angle plus a mounting offset.
struct FakeSensor {
    wheel: Rc<Cell<f32>>,
    mount_offset_deg: f32,
    fail: bool,
    resets: u32,
}

impl AbsoluteAngleSensor for FakeSensor {
    type Error = BusFault;

    fn read_absolute_degrees(&mut self) -> Result<f32, Self::Error> {
        if self.fail {
            return Err(BusFault);
        }
        let deg = radians_to_degrees(self.wheel.get()) + self.mount_offset_deg;
        Ok(((deg % 360.0) + 360.0) % 360.0)
    }

    fn reset_position(&mut self) -> Result<(), Self::Error> {
        self.resets += 1;
        Ok(())
    }
}

type Module = ModuleController<FakeDrive, FakeTurn, FakeSensor>;

/// Build a module whose wheel starts at `start_deg` and whose sensor is
/// mounted `offset_deg` away from mechanical zero.
fn module(
    start_deg: f32,
    offset_deg: f32,
    turn_gain: f32,
    config: ModuleConfig,
) -> (Module, Rc<Cell<f32>>) {
    let wheel = Rc::new(Cell::new(degrees_to_radians(start_deg)));
    let turn = FakeTurn {
        output: None,
        wheel: wheel.clone(),
        gain: turn_gain,
        resets: 0,
    };
    let sensor = FakeSensor {
        wheel: wheel.clone(),
        mount_offset_deg: offset_deg,
        fail: false,
        resets: 0,
    };
    let config = ModuleConfig {
        calibration_offset_deg: offset_deg,
        ..config
    };
    (
        ModuleController::new(FakeDrive::default(), turn, sensor, &config),
        wheel,
    )
}

#[test]
fn test_get_state_uses_calibration_and_conversion() {
    let config = ModuleConfig {
        distance_per_native_unit: 0.001,
        native_time_scale: 10.0,
        ..ModuleConfig::default()
    };
    let (mut m, _) = module(60.0, 30.0, 0.0, config);
    m.drive_mut().velocity = 250.0;

    let state = m.get_state().unwrap();
    assert!((state.speed - 2.5).abs() < 1e-4);
    assert!((state.heading - degrees_to_radians(60.0)).abs() < 1e-4);
}

#[test]
fn test_get_position_accumulates_distance() {
    let config = ModuleConfig {
        distance_per_native_unit: 0.001,
        ..ModuleConfig::default()
    };
    let (mut m, _) = module(-45.0, 200.0, 0.0, config);
    m.drive_mut().position = 1500.0;

    let pos = m.get_position().unwrap();
    assert!((pos.distance - 1.5).abs() < 1e-4);
    assert!((pos.heading - degrees_to_radians(-45.0)).abs() < 1e-4);
}

#[test]
fn test_set_desired_state_flips_past_quarter_turn() {
    let config = ModuleConfig {
        distance_per_native_unit: 0.001,
        native_time_scale: 10.0,
        ..ModuleConfig::default()
    };
    let (mut m, _) = module(0.0, 0.0, 0.0, config);

    let cmd = m
        .set_desired_state(ModuleState::new(2.0, degrees_to_radians(100.0)))
        .unwrap();
    // Reversed drive: -2 m/s at 0.01 m per native velocity unit.
    assert!((cmd.drive_setpoint + 200.0).abs() < 1e-2);
    assert!(cmd.turn_output < 0.0, "should steer toward -80 deg");
    assert_eq!(m.drive_mut().setpoint, Some(cmd.drive_setpoint));
    assert_eq!(m.turn_mut().output, Some(cmd.turn_output));
    assert!((m.turn_state().goal.position - degrees_to_radians(-80.0)).abs() < 1e-4);
}

#[test]
fn test_set_desired_state_keeps_short_rotation() {
    let (mut m, _) = module(-170.0, 15.0, 0.0, ModuleConfig::default());
    m.reset_turn_controller().unwrap();
    let cmd = m
        .set_desired_state(ModuleState::new(1.0, degrees_to_radians(170.0)))
        .unwrap();
    assert!(cmd.drive_setpoint > 0.0);
    // Shortest way from -170 to 170 is clockwise through the seam.
    assert!(cmd.turn_output < 0.0);
}

#[test]
fn test_turn_profile_starts_at_zero_until_reset() {
    let (mut m, _) = module(170.0, 0.0, 0.0, ModuleConfig::default());
    let hold = ModuleState::new(0.0, degrees_to_radians(170.0));

    // Without a reset the profile begins at 0 rad and pulls the wheel back.
    let cmd = m.set_desired_state(hold).unwrap();
    assert_eq!(cmd.turn_output, -1.0);

    m.reset_turn_controller().unwrap();
    let cmd = m.set_desired_state(hold).unwrap();
    assert!(cmd.turn_output.abs() < 1e-4, "output {}", cmd.turn_output);
}

#[test]
fn test_flip_policy_from_config() {
    let config = ModuleConfig {
        flip_policy: FlipPolicy::FlipAtQuarterTurn,
        ..ModuleConfig::default()
    };
    let (mut m, _) = module(0.0, 0.0, 0.0, config);
    let cmd = m.set_desired_state(ModuleState::new(1.0, PI / 2.0)).unwrap();
    assert!(cmd.drive_setpoint < 0.0);
}

#[test]
fn test_turn_output_clamped() {
    let config = ModuleConfig {
        kp: 100.0,
        ..ModuleConfig::default()
    };
    let (mut m, _) = module(0.0, 0.0, 0.0, config);
    for _ in 0..50 {
        let cmd = m
            .set_desired_state(ModuleState::new(0.0, degrees_to_radians(80.0)))
            .unwrap();
        assert!((-1.0..=1.0).contains(&cmd.turn_output));
    }
}

#[test]
fn test_closed_loop_reaches_heading_across_seam() {
    let config = ModuleConfig {
        kp: 4.0,
        ..ModuleConfig::default()
    };
    // Output of 1.0 turns the wheel 0.2 rad per tick.
    let (mut m, wheel) = module(175.0, 77.0, 0.2, config);
    m.reset_turn_controller().unwrap();

    let target = degrees_to_radians(-150.0);
    for _ in 0..300 {
        m.set_desired_state(ModuleState::new(0.5, target)).unwrap();
    }
    let heading = m.get_state().unwrap().heading;
    assert!(
        shortest_error(target, heading).abs() < degrees_to_radians(1.0),
        "heading {} deg",
        radians_to_degrees(heading)
    );
    // The wheel went the short way through ±180 and never unwound.
    assert!(wheel.get() > 0.0);
}

#[test]
fn test_reset_encoders_keeps_calibration() {
    let (mut m, _) = module(30.0, 40.0, 0.0, ModuleConfig::default());
    m.drive_mut().position = 900.0;
    let before = m.get_state().unwrap().heading;

    m.reset_encoders().unwrap();

    assert_eq!(m.drive_mut().position, 0.0);
    assert_eq!(m.drive_mut().resets, 1);
    assert_eq!(m.turn_mut().resets, 1);
    assert_eq!(m.sensor_mut().resets, 1);
    assert!((m.calibration().offset() - degrees_to_radians(40.0)).abs() < 1e-6);
    assert_eq!(m.get_state().unwrap().heading, before);
}

#[test]
fn test_sensor_fault_propagates_without_writing() {
    let (mut m, _) = module(0.0, 0.0, 0.0, ModuleConfig::default());
    m.sensor_mut().fail = true;

    let err = m.set_desired_state(ModuleState::new(1.0, 0.5)).unwrap_err();
    assert!(matches!(err, ModuleError::Sensor(BusFault)));
    assert_eq!(m.drive_mut().setpoint, None);
    assert_eq!(m.turn_mut().output, None);
    assert_eq!(err.to_string(), "angle sensor error: BusFault");
}

#[test]
fn test_stop_zeroes_outputs() {
    let (mut m, _) = module(0.0, 0.0, 0.0, ModuleConfig::default());
    m.set_desired_state(ModuleState::new(3.0, 1.0)).unwrap();
    m.stop().unwrap();
    assert_eq!(m.drive_mut().setpoint, Some(0.0));
    assert_eq!(m.turn_mut().output, Some(0.0));
}

#[test]
fn test_execute_json_commands() {
    let config = ModuleConfig {
        distance_per_native_unit: 0.001,
        native_time_scale: 10.0,
        ..ModuleConfig::default()
    };
    let (mut m, _) = module(10.0, 0.0, 0.0, config);

    let set = ModuleCommand::from_json(r#"{"mc":"set","s":1.0,"h":20.0}"#).unwrap();
    match m.execute_command(set).unwrap() {
        CommandReply::Applied(cmd) => assert!((cmd.drive_setpoint - 100.0).abs() < 1e-2),
        other => panic!("unexpected reply {:?}", other),
    }

    m.drive_mut().position = 2000.0;
    let read = ModuleCommand::from_json(r#"{"mc":"read_position"}"#).unwrap();
    match m.execute_command(read).unwrap() {
        CommandReply::Position(p) => assert!((p.distance - 2.0).abs() < 1e-4),
        other => panic!("unexpected reply {:?}", other),
    }

    let reset = ModuleCommand::from_json(r#"{"mc":"reset_encoders"}"#).unwrap();
    assert_eq!(m.execute_command(reset).unwrap(), CommandReply::Done);
    assert_eq!(m.drive_mut().position, 0.0);
}
