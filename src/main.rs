//! i2cusb - Host-side tool for USB-to-I2C bridges
//!
//! Talks to i2c-tiny-usb compatible bridges over vendor control transfers.
//!
//! # Architecture
//!
//! The binary picks a transport by adapter name (`nusb` for real hardware,
//! `dummy` for the in-memory emulator), runs the echo handshake through
//! [`DeviceSession`](i2cusb_core::DeviceSession) and then drives the bus with
//! [`I2cBus`](i2cusb_core::I2cBus). Every command works the same way on
//! both adapters.

mod adapters;
mod cli;
mod commands;

use std::time::Duration;

use clap::Parser;
use cli::{Cli, Commands};
use i2cusb_core::{I2cError, SessionConfig};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli) {
        match e.downcast_ref::<I2cError>() {
            Some(I2cError::NoAck(address)) => eprintln!("no device at {}", address),
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}

/// Build the session configuration from the global options
fn session_config(cli: &Cli) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = SessionConfig::default();

    if let Some(max) = cli.max_transfer {
        if max == 0 || max > u16::MAX as usize {
            return Err(format!("Invalid --max-transfer {}", max).into());
        }
        config.max_transfer = max;
    }
    if let Some(ms) = cli.timeout_ms {
        if ms == 0 {
            return Err("--timeout-ms must be non-zero".into());
        }
        config.timeout = Some(Duration::from_millis(ms));
    }

    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = session_config(&cli)?;

    match cli.command {
        Commands::List => commands::list_devices(),
        Commands::Info { device } => {
            let mut session = adapters::open_session(&device.device, config)?;
            commands::run_info(&mut session)
        }
        Commands::Status { device } => {
            let mut session = adapters::open_session(&device.device, config)?;
            commands::run_status(&mut session)
        }
        Commands::SetDelay {
            device,
            microseconds,
        } => {
            let mut session = adapters::open_session(&device.device, config)?;
            commands::run_set_delay(&mut session, microseconds)
        }
        Commands::Scan {
            device,
            first,
            last,
        } => {
            let mut bus = adapters::open_bus(&device.device, config)?;
            commands::run_scan(&mut bus, first, last)
        }
        Commands::Read {
            device,
            address,
            length,
        } => {
            let mut bus = adapters::open_bus(&device.device, config)?;
            commands::run_read(&mut bus, address, length)
        }
        Commands::Write {
            device,
            address,
            bytes,
        } => {
            let mut bus = adapters::open_bus(&device.device, config)?;
            commands::run_write(&mut bus, address, &bytes)
        }
        Commands::WriteRead {
            device,
            address,
            bytes,
            len,
        } => {
            let mut bus = adapters::open_bus(&device.device, config)?;
            commands::run_write_read(&mut bus, address, &bytes, len)
        }
    }
}
