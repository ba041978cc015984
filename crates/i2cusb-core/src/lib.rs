//! i2cusb-core - Protocol layer for USB-to-I2C bridges
//!
//! This crate implements the host side of the vendor control-transfer
//! protocol spoken by i2c-tiny-usb compatible bridges (including the RP2040
//! based I2C-Pico-USB). The bridge exposes a single I2C master through the
//! default control endpoint; every command is one vendor request.
//!
//! # Layers
//!
//! - [`request`]: packing of `bmRequestType` and the setup packet fields
//! - [`command`]: the vendor command table and I2C framing flags
//! - [`transport`]: the [`ControlTransport`] trait implemented by USB backends
//! - [`session`]: handshake and device-level commands ([`DeviceSession`])
//! - [`i2c`]: fragmentation and start/stop framing of I2C transactions ([`I2cBus`])
//!
//! # Example
//!
//! ```ignore
//! use i2cusb_core::{DeviceSession, I2cAddress, I2cBus};
//!
//! let session = DeviceSession::open(transport)?;
//! let mut bus = I2cBus::new(session);
//! let eeprom = I2cAddress::new(0x50)?;
//!
//! // Set the EEPROM pointer, then read back with a repeated start
//! let data = bus.write_then_read(eeprom, &[0x00, 0x20], 10)?;
//! ```
//!
//! All calls are blocking. A session is owned by exactly one caller; the
//! borrow checker enforces that fragments of two transactions never
//! interleave on the bus.

pub mod address;
pub mod command;
pub mod error;
pub mod i2c;
pub mod request;
pub mod session;
pub mod transport;

pub use address::I2cAddress;
pub use command::{Command, I2cFlags, TransferDirection};
pub use error::{
    DecodeError, DeviceError, I2cError, InvalidAddress, ParseAddressError, TransportError,
};
pub use i2c::I2cBus;
pub use request::{Direction, Recipient, RequestDescriptor, RequestType, SetupFields};
pub use session::{
    DeviceSession, FunctionBitmap, SessionConfig, SessionState, StatusCheck, StatusCode,
};
pub use transport::{ControlTransport, DataStage};

/// USB vendor ID of i2c-tiny-usb compatible bridges
pub const USB_VENDOR_ID: u16 = 0x0403;
/// USB product ID of i2c-tiny-usb compatible bridges
pub const USB_PRODUCT_ID: u16 = 0xC631;
