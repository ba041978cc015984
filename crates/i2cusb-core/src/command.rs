//! Vendor command table
//!
//! | Command   | Code | Data stage                              |
//! |-----------|------|-----------------------------------------|
//! | Echo      | 0    | 2 bytes in, `wValue` returned verbatim  |
//! | GetFunc   | 1    | 4-byte capability word in               |
//! | SetDelay  | 2    | none, delay in `wValue`                 |
//! | GetStatus | 3    | 1 status byte in                        |
//! | I2cIo     | 4    | payload, Begin/End flags in bits 0-1    |

use bitflags::bitflags;

use crate::request::{Direction, RequestDescriptor};

pub const CMD_ECHO: u8 = 0;
pub const CMD_GET_FUNC: u8 = 1;
pub const CMD_SET_DELAY: u8 = 2;
pub const CMD_GET_STATUS: u8 = 3;
pub const CMD_I2C_IO: u8 = 4;

/// `wValue` bit marking an I2C read (matches Linux `I2C_M_RD`)
pub const I2C_M_RD: u16 = 0x0001;

bitflags! {
    /// Framing flags ORed into the I2C_IO command code
    ///
    /// The flags are independent: a transfer with `BEGIN` but no `END`
    /// leaves the bus held so the next transfer starts with a repeated
    /// start. A transfer with neither flag continues an open transaction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct I2cFlags: u8 {
        /// Generate a start condition before addressing
        const BEGIN = 0x01;
        /// Generate a stop condition after this transfer
        const END = 0x02;
    }
}

impl Default for I2cFlags {
    fn default() -> Self {
        I2cFlags::empty()
    }
}

/// A vendor command understood by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Echo,
    GetFunc,
    SetDelay,
    GetStatus,
    I2cIo(I2cFlags),
}

impl Command {
    /// The `bRequest` code for this command
    pub const fn code(self) -> u8 {
        match self {
            Command::Echo => CMD_ECHO,
            Command::GetFunc => CMD_GET_FUNC,
            Command::SetDelay => CMD_SET_DELAY,
            Command::GetStatus => CMD_GET_STATUS,
            Command::I2cIo(flags) => CMD_I2C_IO | flags.bits(),
        }
    }

    /// Parse a `bRequest` code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            CMD_ECHO => Some(Command::Echo),
            CMD_GET_FUNC => Some(Command::GetFunc),
            CMD_GET_STATUS => Some(Command::GetStatus),
            CMD_SET_DELAY => Some(Command::SetDelay),
            c if c & !I2cFlags::all().bits() == CMD_I2C_IO => {
                Some(Command::I2cIo(I2cFlags::from_bits_truncate(c)))
            }
            _ => None,
        }
    }

    /// Build the vendor request for this command
    pub const fn request(self, direction: Direction, value: u16, index: u16) -> RequestDescriptor {
        match direction {
            Direction::In => RequestDescriptor::vendor_in(self.code(), value, index),
            Direction::Out => RequestDescriptor::vendor_out(self.code(), value, index),
        }
    }
}

/// I2C data direction of an I2C_IO transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    Write,
    Read,
}

impl TransferDirection {
    /// Value placed in `wValue`
    pub const fn value(self) -> u16 {
        match self {
            TransferDirection::Write => 0,
            TransferDirection::Read => I2C_M_RD,
        }
    }

    /// USB data-stage direction that carries the payload
    pub const fn usb_direction(self) -> Direction {
        match self {
            TransferDirection::Write => Direction::Out,
            TransferDirection::Read => Direction::In,
        }
    }

    pub fn from_value(value: u16) -> Self {
        if value & I2C_M_RD != 0 {
            TransferDirection::Read
        } else {
            TransferDirection::Write
        }
    }
}
