//! CLI argument parsing

use crate::adapters;
use clap::{Parser, Subcommand};
use i2cusb_core::I2cAddress;

/// Parse a string as a hex or decimal u8
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u8>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a 7-bit I2C address
fn parse_address(s: &str) -> Result<I2cAddress, String> {
    s.parse::<I2cAddress>().map_err(|e| e.to_string())
}

/// Generate dynamic help text for the device argument
fn device_help() -> String {
    format!(
        "Adapter to use, with optional key=value options [available: {}]",
        adapters::adapter_names_short()
    )
}

#[derive(Parser)]
#[command(name = "i2cusb")]
#[command(author, version, about = "USB-to-I2C bridge tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Largest data stage per I2C transfer
    #[arg(long, global = true)]
    pub max_transfer: Option<usize>,

    /// Per-transfer timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Device selection shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    #[arg(short, long, default_value = "nusb", help = device_help())]
    pub device: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List connected bridges
    List,

    /// Show the capabilities and status of a bridge
    Info {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Probe every address in a range and print a presence grid
    Scan {
        #[command(flatten)]
        device: DeviceArgs,

        /// First address to probe
        #[arg(long, default_value = "0x08", value_parser = parse_hex_u8)]
        first: u8,

        /// Last address to probe
        #[arg(long, default_value = "0x77", value_parser = parse_hex_u8)]
        last: u8,
    },

    /// Read bytes from a peripheral
    Read {
        #[command(flatten)]
        device: DeviceArgs,

        /// Peripheral address
        #[arg(value_parser = parse_address)]
        address: I2cAddress,

        /// Number of bytes to read
        length: usize,
    },

    /// Write bytes to a peripheral
    Write {
        #[command(flatten)]
        device: DeviceArgs,

        /// Peripheral address
        #[arg(value_parser = parse_address)]
        address: I2cAddress,

        /// Bytes to write (hex or decimal)
        #[arg(value_parser = parse_hex_u8)]
        bytes: Vec<u8>,
    },

    /// Write bytes, then read back after a repeated start
    WriteRead {
        #[command(flatten)]
        device: DeviceArgs,

        /// Peripheral address
        #[arg(value_parser = parse_address)]
        address: I2cAddress,

        /// Bytes to write (hex or decimal)
        #[arg(value_parser = parse_hex_u8, required = true)]
        bytes: Vec<u8>,

        /// Number of bytes to read
        #[arg(short, long)]
        len: usize,
    },

    /// Set the I2C clock delay in microseconds
    SetDelay {
        #[command(flatten)]
        device: DeviceArgs,

        /// Delay in microseconds
        microseconds: u16,
    },

    /// Show the status of the last I2C transfer
    Status {
        #[command(flatten)]
        device: DeviceArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_u8() {
        assert_eq!(parse_hex_u8("0x50"), Ok(0x50));
        assert_eq!(parse_hex_u8("80"), Ok(80));
        assert!(parse_hex_u8("0x100").is_err());
        assert!(parse_hex_u8("zz").is_err());
    }

    #[test]
    fn test_write_read_arguments() {
        let cli = Cli::try_parse_from([
            "i2cusb",
            "-vv",
            "write-read",
            "-d",
            "dummy:eeprom=0x50",
            "0x50",
            "0x00",
            "0x20",
            "--len",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::WriteRead {
                device,
                address,
                bytes,
                len,
            } => {
                assert_eq!(device.device, "dummy:eeprom=0x50");
                assert_eq!(address.get(), 0x50);
                assert_eq!(bytes, vec![0x00, 0x20]);
                assert_eq!(len, 10);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_address_out_of_range() {
        assert!(Cli::try_parse_from(["i2cusb", "read", "0x80", "1"]).is_err());
    }

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["i2cusb", "scan"]).unwrap();
        match cli.command {
            Commands::Scan {
                device,
                first,
                last,
            } => {
                assert_eq!(device.device, "nusb");
                assert_eq!((first, last), (0x08, 0x77));
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
