//! Example: Read the microstep setting from a controller.
//!
//! Run with: `cargo run --example read_microsteps -- 192.168.10.77`
//!
//! Set `RUST_LOG=debug` to see every command and raw reply.

use std::time::Duration;

use mcode_stage::{Controller, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let host = std::env::args()
        .nth(1)
        .unwrap_or_else(|| mcode_stage::config::DEFAULT_HOST.to_owned());

    init_logging();

    let mut controller = Controller::builder()
        .host(&host)
        .connect_timeout(Duration::from_secs(5))
        .connect()?;

    println!("{}", controller.microsteps()?);

    controller.close();
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mcode_stage=info")),
        )
        .init();
}
