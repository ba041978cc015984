//! nusb device implementation
//!
//! This module provides [`NusbTransport`], which finds a bridge on the USB
//! bus, claims its interface and runs vendor control transfers on it.

use std::time::Duration;

use i2cusb_core::request::{Recipient, RequestType};
use i2cusb_core::{ControlTransport, DataStage, RequestDescriptor, TransportError};
use nusb::transfer::{ControlIn, ControlOut, ControlType, TransferError};
use nusb::{Interface, MaybeFuture};

use crate::error::{NusbError, Result};

/// Default control transfer timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Configuration options for opening a bridge
#[derive(Debug, Clone)]
pub struct NusbConfig {
    /// USB vendor ID to match
    pub vid: u16,
    /// USB product ID to match
    pub pid: u16,
    /// Device index (when multiple devices are connected)
    pub device_index: usize,
    /// Serial number to search for
    pub serial: Option<String>,
    /// Interface to claim
    pub interface: u8,
    /// Control transfer timeout
    pub timeout: Duration,
}

impl Default for NusbConfig {
    fn default() -> Self {
        Self {
            vid: i2cusb_core::USB_VENDOR_ID,
            pid: i2cusb_core::USB_PRODUCT_ID,
            device_index: 0,
            serial: None,
            interface: 0,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Parse a hex (`0x0403`) or decimal number
fn parse_u16(s: &str) -> Option<u16> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

/// Parse options from key=value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<NusbConfig> {
    let mut config = NusbConfig::default();

    for (key, value) in options {
        match *key {
            "device" | "index" => {
                config.device_index = value
                    .parse()
                    .map_err(|_| NusbError::InvalidParameter(format!("device: {}", value)))?;
            }
            "serial" => {
                config.serial = Some(value.to_string());
            }
            "vid" => {
                config.vid = parse_u16(value)
                    .ok_or_else(|| NusbError::InvalidParameter(format!("vid: {}", value)))?;
            }
            "pid" => {
                config.pid = parse_u16(value)
                    .ok_or_else(|| NusbError::InvalidParameter(format!("pid: {}", value)))?;
            }
            "interface" => {
                config.interface = value
                    .parse()
                    .map_err(|_| NusbError::InvalidParameter(format!("interface: {}", value)))?;
            }
            "timeout" => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| NusbError::InvalidParameter(format!("timeout: {}", value)))?;
                if ms == 0 {
                    return Err(NusbError::InvalidParameter(
                        "timeout must be non-zero".to_string(),
                    ));
                }
                config.timeout = Duration::from_millis(ms);
            }
            _ => {
                return Err(NusbError::InvalidParameter(format!(
                    "unknown option: {}",
                    key
                )));
            }
        }
    }

    Ok(config)
}

/// Information about a connected bridge
#[derive(Debug, Clone)]
pub struct BridgeDeviceInfo {
    pub bus: u8,
    pub address: u8,
    pub vid: u16,
    pub pid: u16,
    pub serial: Option<String>,
    pub product: Option<String>,
}

impl std::fmt::Display for BridgeDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bus {:03} Device {:03}: ID {:04x}:{:04x}",
            self.bus, self.address, self.vid, self.pid
        )?;
        if let Some(product) = &self.product {
            write!(f, " {}", product)?;
        }
        if let Some(serial) = &self.serial {
            write!(f, " (serial {})", serial)?;
        }
        Ok(())
    }
}

/// USB-I2C bridge opened through nusb
pub struct NusbTransport {
    /// Claimed USB interface
    interface: Interface,
    timeout: Duration,
}

impl NusbTransport {
    /// Open the first bridge with the default identifiers
    pub fn open() -> Result<Self> {
        Self::open_with_config(NusbConfig::default())
    }

    /// Open a bridge with the specified configuration
    pub fn open_with_config(config: NusbConfig) -> Result<Self> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| NusbError::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == config.vid && d.product_id() == config.pid)
            .collect();

        let not_found = NusbError::DeviceNotFound {
            vid: config.vid,
            pid: config.pid,
        };

        let device_info = match &config.serial {
            Some(serial) => devices
                .iter()
                .find(|d| d.serial_number() == Some(serial.as_str()))
                .ok_or(not_found)?,
            None => devices.get(config.device_index).ok_or(not_found)?,
        };

        log::info!(
            "Opening USB-I2C bridge at bus {} address {}",
            device_info.busnum(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| NusbError::OpenFailed(e.to_string()))?;

        let interface = device
            .claim_interface(config.interface)
            .wait()
            .map_err(|e| NusbError::ClaimFailed(e.to_string()))?;

        log::debug!(
            "Claimed interface {} on {:04X}:{:04X}",
            config.interface,
            device_info.vendor_id(),
            device_info.product_id()
        );

        Ok(Self {
            interface,
            timeout: config.timeout,
        })
    }

    /// List all connected bridges with the default identifiers
    pub fn list_devices() -> Result<Vec<BridgeDeviceInfo>> {
        Self::list_devices_matching(i2cusb_core::USB_VENDOR_ID, i2cusb_core::USB_PRODUCT_ID)
    }

    /// List connected devices with the given identifiers
    pub fn list_devices_matching(vid: u16, pid: u16) -> Result<Vec<BridgeDeviceInfo>> {
        let devices = nusb::list_devices()
            .wait()
            .map_err(|e| NusbError::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == vid && d.product_id() == pid)
            .map(|d| BridgeDeviceInfo {
                bus: d.busnum(),
                address: d.device_address(),
                vid: d.vendor_id(),
                pid: d.product_id(),
                serial: d.serial_number().map(str::to_string),
                product: d.product_string().map(str::to_string),
            })
            .collect();

        Ok(devices)
    }
}

fn control_type(request_type: RequestType) -> ControlType {
    match request_type {
        RequestType::Standard => ControlType::Standard,
        RequestType::Class => ControlType::Class,
        RequestType::Vendor => ControlType::Vendor,
    }
}

fn recipient(recipient: Recipient) -> nusb::transfer::Recipient {
    match recipient {
        Recipient::Device => nusb::transfer::Recipient::Device,
        Recipient::Interface => nusb::transfer::Recipient::Interface,
        Recipient::Endpoint => nusb::transfer::Recipient::Endpoint,
        Recipient::Other => nusb::transfer::Recipient::Other,
    }
}

fn map_transfer_error(e: TransferError) -> TransportError {
    match e {
        TransferError::Stall => TransportError::Stall,
        TransferError::Disconnected => TransportError::Disconnected,
        // nusb cancels a control transfer when its timeout expires
        TransferError::Cancelled => TransportError::Timeout,
        other => TransportError::Other(other.to_string()),
    }
}

impl ControlTransport for NusbTransport {
    fn transfer(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
        timeout: Duration,
    ) -> std::result::Result<usize, TransportError> {
        if request.direction != data.direction() {
            return Err(TransportError::DirectionMismatch);
        }

        match data {
            DataStage::In(buf) => {
                let length = u16::try_from(buf.len())
                    .map_err(|_| TransportError::Other("data stage too long".to_string()))?;
                let received = self
                    .interface
                    .control_in(
                        ControlIn {
                            control_type: control_type(request.request_type),
                            recipient: recipient(request.recipient),
                            request: request.command,
                            value: request.value,
                            index: request.index,
                            length,
                        },
                        timeout,
                    )
                    .wait()
                    .map_err(map_transfer_error)?;

                let len = received.len().min(buf.len());
                buf[..len].copy_from_slice(&received[..len]);
                log::trace!("  in: {:02X?}", &buf[..len]);
                Ok(len)
            }
            DataStage::Out(bytes) => {
                self.interface
                    .control_out(
                        ControlOut {
                            control_type: control_type(request.request_type),
                            recipient: recipient(request.recipient),
                            request: request.command,
                            value: request.value,
                            index: request.index,
                            data: bytes,
                        },
                        timeout,
                    )
                    .wait()
                    .map_err(map_transfer_error)?;
                Ok(bytes.len())
            }
        }
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }
}
