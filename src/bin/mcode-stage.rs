//! # mcode-stage
//!
//! Operator command line for an MCode-controlled linear stage.
//!
//! ```bash
//! mcode-stage --config stage.toml configure
//! mcode-stage --config stage.toml move 25
//! mcode-stage --host 192.168.33.1 get VM
//! mcode-stage raw "PR MS"
//! ```
//!
//! Each invocation connects, runs one command and disconnects.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mcode_stage::controller::Scalar;
use mcode_stage::{
    load_config, Controller, Millimeters, Stage, StageConfig, StdDelay, VariableValue,
};

/// Command-line interface for an MCode linear stage
#[derive(Parser, Debug)]
#[command(name = "mcode-stage")]
#[command(about = "Command-line interface for an MCode linear stage", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Controller host (overrides the configuration)
    #[arg(long)]
    host: Option<String>,

    /// Controller port (overrides the configuration)
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show position, motion state and the current profile
    Status,

    /// Read a register
    Get {
        /// Register name (e.g. VM, C1)
        name: String,
    },

    /// Write a register; several values are sent comma-joined
    Set {
        /// Register name
        name: String,
        /// Value fields
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Send a raw command and print the response lines
    Raw {
        /// Command text without terminator
        command: String,
    },

    /// Home the stage and zero the counter
    Home,

    /// Absolute move from home with the trip armed, then return home
    Move {
        /// Target in millimeters (defaults to the configured move length)
        #[arg(allow_hyphen_values = true)]
        mm: Option<f64>,
    },

    /// Relative move without waiting
    Jog {
        /// Distance in millimeters, negative for backward
        #[arg(allow_hyphen_values = true)]
        mm: f64,
    },

    /// Pause motion
    Pause,

    /// Send setup commands and write the configured profile
    Configure,

    /// Check the controller's microstep setting against the configuration
    Microsteps,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mcode_stage=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let controller = Controller::builder()
        .from_config(&config)
        .connect()
        .with_context(|| format!("connecting to {}", config.controller.address()))?;
    let mut stage = Stage::from_config(controller, &config, StdDelay);

    run(&mut stage, &config, cli.command)
}

fn resolve_config(cli: &Cli) -> Result<StageConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => StageConfig::default(),
    };
    if let Some(host) = &cli.host {
        config.controller.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.controller.port = port;
    }
    mcode_stage::validate_config(&config).context("invalid configuration")?;
    Ok(config)
}

fn run(stage: &mut Stage, config: &StageConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Status => {
            let position = stage.position().context("reading position")?;
            let moving = stage
                .controller_mut()
                .is_moving()
                .context("reading motion state")?;
            let microsteps = stage
                .controller_mut()
                .microsteps()
                .context("reading microsteps")?;
            let profile = stage.read_profile().context("reading profile")?;

            let peer = stage.controller().transport().peer().unwrap_or("-");
            println!("controller        {peer}");
            println!("position          {:.4} mm", position.0);
            println!("moving            {moving}");
            println!("microsteps        {microsteps}");
            println!("{profile}");
        }

        Commands::Get { name } => {
            let value = stage
                .controller_mut()
                .read_variable(&name)
                .with_context(|| format!("reading {name}"))?;
            println!("{value}");
        }

        Commands::Set { name, values } => {
            let value = parse_value(values);
            stage
                .controller_mut()
                .write_variable(&name, value)
                .with_context(|| format!("writing {name}"))?;
        }

        Commands::Raw { command } => {
            let response = stage
                .controller_mut()
                .send_command(&command)
                .with_context(|| format!("sending {command:?}"))?;
            for line in &response.lines {
                println!("{line}");
            }
        }

        Commands::Home => stage.home().context("homing")?,

        Commands::Move { mm } => {
            let target = mm.map(Millimeters).unwrap_or(config.motion.move_length);
            let reached = stage.execute_move(target).context("executing move")?;
            println!("moved to {:.4} mm and returned home", reached.0);
        }

        Commands::Jog { mm } => {
            let steps = stage.jog(Millimeters(mm)).context("jogging")?;
            println!("jog {mm} mm ({} steps)", steps.value());
        }

        Commands::Pause => stage.controller_mut().pause().context("pausing")?,

        Commands::Configure => {
            let current = stage.read_profile().context("reading profile")?;
            let profile = config.motion.overlay(current);
            stage
                .apply_profile(&profile, &config.setup.commands)
                .context("applying profile")?;
            println!("{profile}");
        }

        Commands::Microsteps => {
            stage.verify_microsteps().context("verifying microsteps")?;
            println!("microsteps match ({})", config.stage.microsteps.value());
        }
    }

    Ok(())
}

/// Integers are sent as numbers, anything else verbatim.
fn parse_value(values: Vec<String>) -> VariableValue {
    let mut fields: Vec<Scalar> = values
        .into_iter()
        .map(|v| match v.parse::<i64>() {
            Ok(n) => Scalar::Int(n),
            Err(_) => Scalar::Text(v),
        })
        .collect();

    if fields.len() == 1 {
        VariableValue::Scalar(fields.remove(0))
    } else {
        VariableValue::Sequence(fields)
    }
}
