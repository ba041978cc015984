//! Error types for i2cusb-core
//!
//! Errors are layered the same way the protocol is:
//! [`TransportError`] comes from the USB backend, [`DeviceError`] from the
//! session, and [`I2cError`] from the transaction engine. Transport faults
//! pass through every layer unchanged.

use thiserror::Error;

use crate::address::I2cAddress;
use crate::command::Command;
use crate::session::StatusCode;

/// A control transfer failed at the USB level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The device answered the request with a STALL handshake
    #[error("control endpoint stalled")]
    Stall,
    /// The transfer did not complete within the timeout
    #[error("control transfer timed out")]
    Timeout,
    /// The device is gone
    #[error("device disconnected")]
    Disconnected,
    /// The data stage direction does not match the request
    #[error("data stage direction does not match the request")]
    DirectionMismatch,
    /// Any other host controller or OS failure
    #[error("control transfer failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether this fault leaves the device in an unknown state
    ///
    /// A stall is the device refusing one request; the endpoint recovers
    /// with the next setup packet. Everything else ends the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TransportError::Stall | TransportError::DirectionMismatch)
    }
}

/// Device session errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// USB transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The echo handshake returned the wrong bytes
    #[error("echo handshake failed: expected {expected:02X?}, got {actual:02X?}")]
    ProtocolMismatch { expected: [u8; 2], actual: Vec<u8> },

    /// The device did not answer the handshake
    #[error("device did not answer the echo handshake: {0}")]
    Unresponsive(TransportError),

    /// The device stalled a device-level command
    #[error("device rejected {command:?} (wValue {value})")]
    DeviceRejected { command: Command, value: u16 },

    /// The device returned fewer bytes than the command defines
    #[error("short response to {command:?}: expected {expected} bytes, got {actual}")]
    ShortResponse {
        command: Command,
        expected: usize,
        actual: usize,
    },

    /// The session has been closed by an earlier transport fault
    #[error("session is closed")]
    SessionClosed,
}

/// I2C transaction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum I2cError {
    /// No peripheral acknowledged the address
    ///
    /// This is the expected outcome of a presence check on an empty
    /// address and is safe to handle.
    #[error("no acknowledge from I2C address {0}")]
    NoAck(I2cAddress),

    /// Fewer bytes moved than requested
    #[error("truncated I2C transfer at {address}: expected {expected} bytes, transferred {actual}")]
    Truncated {
        address: I2cAddress,
        expected: usize,
        actual: usize,
    },

    /// The device refused the transfer and reported a status other than
    /// address NACK
    #[error("I2C transfer at {address} failed with device status {status}")]
    Bus {
        address: I2cAddress,
        status: StatusCode,
    },

    /// Address outside the 7-bit range
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),

    /// Session or transport failure
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl From<TransportError> for I2cError {
    fn from(e: TransportError) -> Self {
        I2cError::Device(DeviceError::Transport(e))
    }
}

impl I2cError {
    /// Whether this error means "nobody answered at this address"
    pub fn is_no_ack(&self) -> bool {
        matches!(self, I2cError::NoAck(_))
    }
}

/// `bmRequestType` byte that does not describe a valid request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Type field is 3 (invalid)
    #[error("invalid request type in bmRequestType 0x{0:02X}")]
    InvalidType(u8),
    /// Recipient field is 4-31 (reserved)
    #[error("reserved recipient in bmRequestType 0x{0:02X}")]
    ReservedRecipient(u8),
}

/// Value that does not fit in a 7-bit I2C address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid 7-bit I2C address 0x{0:X}")]
pub struct InvalidAddress(pub u16);

/// Text that does not parse as an I2C address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAddressError {
    #[error("invalid I2C address {0:?}: expected hex (0x50) or decimal (80)")]
    Syntax(String),
    #[error(transparent)]
    OutOfRange(#[from] InvalidAddress),
}

/// Result type for session operations
pub type Result<T> = core::result::Result<T, DeviceError>;
