//! Example: Configuration-driven stage operation.
//!
//! This example demonstrates how to:
//! - Load stage configuration from TOML
//! - Convert between millimeters and controller steps
//! - Apply the configured profile and run the configured move
//!
//! A small in-process controller stands in for the hardware, so the example
//! runs anywhere.
//!
//! Run with: `cargo run --example config_driven`

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use mcode_stage::{parse_config, Controller, Millimeters, Result, Stage, StdDelay};

const CONFIG: &str = include_str!("stage.toml");

fn main() -> Result<()> {
    let mut config = parse_config(CONFIG)?;

    println!("=== Stage ===");
    let mechanics = &config.stage;
    println!("steps/rev:     {}", mechanics.steps_per_revolution());
    println!("mm/step:       {:.9}", mechanics.mm_per_step());
    println!(
        "move length:   {} mm = {} steps",
        config.motion.move_length.0,
        mechanics.to_steps(config.motion.move_length).value()
    );
    println!(
        "jog step:      {} mm = {} steps",
        config.motion.step_length.0,
        mechanics.to_steps(config.motion.step_length).value()
    );

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            serve(stream);
        }
    });

    config.controller.host = "127.0.0.1".into();
    config.controller.port = port;
    config.motion.settle_ms = 10;

    let controller = Controller::builder().from_config(&config).connect()?;
    let mut stage = Stage::from_config(controller, &config, StdDelay);

    println!("\n=== Controller ===");
    stage.verify_microsteps()?;
    println!("microsteps verified");

    let profile = config.motion.overlay(stage.read_profile()?);
    stage.apply_profile(&profile, &config.setup.commands)?;
    println!("{profile}");

    let reached = stage.execute_configured_move()?;
    println!("moved to {} mm and returned home", reached.0);

    Ok(())
}

/// Echo each command, answer queries with plausible idle values.
fn serve(stream: TcpStream) {
    let Ok(mut writer) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(stream);
    let mut command = Vec::new();

    while let Ok(n) = reader.read_until(b'\r', &mut command) {
        if n == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&command).trim_end().to_owned();
        command.clear();

        let value = match text.strip_prefix("PR ") {
            Some("MS") => Some("256"),
            Some("TP") => Some("0,0"),
            Some(_) => Some("0"),
            None => None,
        };
        let reply = match value {
            Some(v) => format!("{text}\r\n{v}\r\n>"),
            None => format!("{text}\r\n>"),
        };
        if writer.write_all(reply.as_bytes()).is_err() {
            break;
        }
    }
}
