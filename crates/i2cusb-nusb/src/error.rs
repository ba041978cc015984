//! Error types for the nusb backend

use thiserror::Error;

/// Result type for device discovery and opening
pub type Result<T> = std::result::Result<T, NusbError>;

/// Errors that can occur while finding and opening a bridge
#[derive(Debug, Error)]
pub enum NusbError {
    /// No matching device
    #[error("USB-I2C bridge not found (VID:{vid:04x} PID:{pid:04x})")]
    DeviceNotFound { vid: u16, pid: u16 },

    /// Failed to enumerate or open the device
    #[error("Failed to open bridge: {0}")]
    OpenFailed(String),

    /// Failed to claim the interface
    #[error("Failed to claim interface: {0}")]
    ClaimFailed(String),

    /// Parameter parsing error
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
