//! Host-side simulation of one swerve module.
//!
//! Runs a `ModuleController` against a simulated wheel, either holding a single
//! desired state for `--ticks` ticks or replaying a JSON-lines command script.

mod plant;

use core::cell::RefCell;
use std::{fs, path::PathBuf, rc::Rc, thread, time::Duration};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use swerve_core::utils::{
    controllers::CommandReply,
    math::angle::{degrees_to_radians, radians_to_degrees, shortest_error},
    ModuleCommand, ModuleConfig, ModuleController, ModulePosition, ModuleState,
};
use tracing::{debug, info, warn};

use crate::plant::{PlantParams, SimDrive, SimSensor, SimTurn, WheelPlant};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// module configuration (JSON); defaults are used when omitted
    #[clap(long)]
    config: Option<PathBuf>,
    /// JSON-lines command script, one command per tick
    #[clap(long)]
    commands: Option<PathBuf>,
    /// number of ticks to hold the desired state
    #[clap(long, default_value_t = 150)]
    ticks: u32,
    /// desired wheel speed (m/s)
    #[clap(long, default_value_t = 1.0, allow_hyphen_values = true)]
    speed: f32,
    /// desired wheel heading (deg)
    #[clap(long, default_value_t = 90.0, allow_hyphen_values = true)]
    heading_deg: f32,
    /// initial mechanical wheel angle (deg)
    #[clap(long, default_value_t = 0.0, allow_hyphen_values = true)]
    start_deg: f32,
    /// steering rate at full output (rad/s)
    #[clap(long, default_value_t = 12.0)]
    turn_rate: f32,
    /// sleep one control period per tick
    #[clap(long)]
    realtime: bool,
    /// print the final summary as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    ticks: u32,
    state: ModuleState,
    position: ModulePosition,
    heading_error_deg: Option<f32>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ModuleConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Ok(ModuleConfig::from_json(&text)?)
        }
        None => Ok(ModuleConfig::default()),
    }
}

fn load_script(path: &PathBuf) -> anyhow::Result<Vec<ModuleCommand>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading command script {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            ModuleCommand::from_json(line)
                .with_context(|| format!("{}:{}: invalid command", path.display(), n + 1))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let config = load_config(opts.config.as_ref())?;
    info!(?config, "module configuration loaded");

    let script = match &opts.commands {
        Some(path) => load_script(path)?,
        None => {
            let set = ModuleCommand::Set {
                s: opts.speed,
                h: opts.heading_deg,
            };
            vec![set; opts.ticks as usize]
        }
    };

    let params = PlantParams {
        turn_rate: opts.turn_rate,
        drive_time_constant: 0.05,
        native_time_scale: config.native_time_scale,
        mount_offset_deg: config.calibration_offset_deg,
    };
    let plant = Rc::new(RefCell::new(WheelPlant::new(
        params,
        degrees_to_radians(opts.start_deg),
    )));

    let mut module = ModuleController::new(
        SimDrive(plant.clone()),
        SimTurn(plant.clone()),
        SimSensor(plant.clone()),
        &config,
    );
    module.reset_turn_controller()?;

    let period = config.period_s;
    let mut last_goal = None;

    for (tick, command) in script.iter().enumerate() {
        if let ModuleCommand::Set { h, .. } = command {
            last_goal = Some(degrees_to_radians(*h));
        }

        let reply = module.execute_command(*command)?;
        if let CommandReply::Applied(cmd) = reply {
            debug!(tick, ?cmd, "applied");
        } else {
            let text = serde_json::to_string(&reply)?;
            info!(tick, reply = %text, "command executed");
        }

        plant.borrow_mut().step(period);

        if tick % 10 == 0 {
            let state = module.get_state()?;
            info!(
                tick,
                speed = state.speed,
                heading_deg = radians_to_degrees(state.heading),
                "module state"
            );
        }

        if opts.realtime && period > 0.0 {
            thread::sleep(Duration::from_secs_f32(period));
        }
    }

    module.stop()?;

    let state = module.get_state()?;
    let position = module.get_position()?;
    // A flipped wheel also satisfies the goal, so compare on the half circle.
    let heading_error_deg = last_goal.map(|goal| {
        let err = shortest_error(goal, state.heading);
        let err = if err.abs() > core::f32::consts::FRAC_PI_2 {
            shortest_error(goal + core::f32::consts::PI, state.heading)
        } else {
            err
        };
        radians_to_degrees(err)
    });
    if let Some(err) = heading_error_deg {
        if err.abs() > 5.0 {
            warn!(err, "wheel did not settle on the requested heading");
        }
    }

    let summary = Summary {
        ticks: script.len() as u32,
        state,
        position,
        heading_error_deg,
    };
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            ticks = summary.ticks,
            speed = summary.state.speed,
            heading_deg = radians_to_degrees(summary.state.heading),
            distance = summary.position.distance,
            mechanical_deg = radians_to_degrees(plant.borrow().angle()),
            "simulation finished"
        );
    }
    Ok(())
}
