//! i2cusb-nusb - USB backend for i2c-tiny-usb compatible bridges
//!
//! This crate opens a bridge with [nusb](https://docs.rs/nusb) and
//! implements [`ControlTransport`](i2cusb_core::ControlTransport) on top of
//! its control transfers. Supported devices are anything answering the
//! i2c-tiny-usb vendor requests, by default VID:0403 PID:C631
//! (i2c-tiny-usb, I2C-Pico-USB).
//!
//! # Example
//!
//! ```no_run
//! use i2cusb_core::{DeviceSession, I2cAddress, I2cBus};
//! use i2cusb_nusb::NusbTransport;
//!
//! let transport = NusbTransport::open()?;
//! let mut bus = I2cBus::new(DeviceSession::open(transport)?);
//!
//! let eeprom = I2cAddress::new(0x50)?;
//! if bus.probe(eeprom)? {
//!     let data = bus.write_then_read(eeprom, &[0x00, 0x20], 10)?;
//!     println!("{:02X?}", data);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Configuration Options
//!
//! - `device=N` or `index=N`: Select the Nth matching device (0-indexed)
//! - `serial=XXXX`: Select the device with this serial number
//! - `vid=0xVVVV`, `pid=0xPPPP`: Match other USB identifiers
//! - `timeout=N`: Control transfer timeout in milliseconds
//! - `interface=N`: Interface to claim (default 0)

mod device;
mod error;

pub use device::{parse_options, BridgeDeviceInfo, NusbConfig, NusbTransport};
pub use error::{NusbError, Result};
