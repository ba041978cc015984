//! i2cusb-dummy - In-memory bridge emulator for testing
//!
//! This crate provides a [`DummyBridge`] that answers vendor control
//! requests the way i2c-tiny-usb firmware does, with emulated peripherals
//! attached to its I2C bus. It records every transfer and can inject
//! faults, which makes it useful for testing and development without real
//! hardware.

mod memory;

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use i2cusb_core::command::Command;
use i2cusb_core::request::{Recipient, RequestType};
use i2cusb_core::{
    ControlTransport, DataStage, FunctionBitmap, I2cAddress, I2cFlags, RequestDescriptor,
    StatusCode, TransferDirection, TransportError,
};
use thiserror::Error;

pub use memory::Memory;

/// An emulated I2C peripheral
pub trait Peripheral: Send {
    /// Start or repeated start addressed to this peripheral
    fn start(&mut self, _direction: TransferDirection) {}

    /// Bytes written by the master
    fn write(&mut self, bytes: &[u8]);

    /// Bytes requested by the master
    fn read(&mut self, buf: &mut [u8]);

    /// Stop condition
    fn stop(&mut self) {}
}

/// Errors from dummy option parsing
#[derive(Debug, Error)]
pub enum DummyError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Configuration for the dummy bridge
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Capability word returned by GetFunc
    pub func: u32,
    /// Largest I2C_IO data stage accepted; larger requests stall
    pub max_transfer: usize,
    /// Largest SetDelay value accepted; larger values stall
    pub max_delay_us: u16,
    /// Answer the echo handshake with swapped bytes
    pub broken_echo: bool,
    /// EEPROMs (24C32) to attach
    pub eeproms: Vec<I2cAddress>,
    /// 256-byte register devices to attach
    pub rams: Vec<I2cAddress>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            func: (FunctionBitmap::I2C | FunctionBitmap::SMBUS_EMUL | FunctionBitmap::NOSTART)
                .bits(),
            max_transfer: 64,
            max_delay_us: 10_000,
            broken_echo: false,
            eeproms: Vec::new(),
            rams: Vec::new(),
        }
    }
}

fn parse_address_list(key: &str, value: &str) -> Result<Vec<I2cAddress>, DummyError> {
    value
        .split('+')
        .map(|s| {
            s.parse()
                .map_err(|_| DummyError::InvalidParameter(format!("{}: {}", key, s)))
        })
        .collect()
}

/// Parse options from key=value pairs
///
/// - `eeprom=0x50+0x51`: attach 24C32 EEPROMs
/// - `ram=0x68`: attach 256-byte register devices
/// - `maxlen=N`: largest data stage per transfer
/// - `maxdelay=N`: largest accepted SetDelay value
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, DummyError> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "eeprom" => config.eeproms = parse_address_list(key, value)?,
            "ram" => config.rams = parse_address_list(key, value)?,
            "maxlen" => {
                config.max_transfer = value
                    .parse()
                    .map_err(|_| DummyError::InvalidParameter(format!("maxlen: {}", value)))?;
            }
            "maxdelay" => {
                config.max_delay_us = value
                    .parse()
                    .map_err(|_| DummyError::InvalidParameter(format!("maxdelay: {}", value)))?;
            }
            _ => {
                return Err(DummyError::InvalidParameter(format!(
                    "unknown option: {}",
                    key
                )));
            }
        }
    }

    Ok(config)
}

/// Fault to inject into a specific transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Fail the transfer with this error. [`TransportError::Disconnected`]
    /// also fails every later transfer.
    Error(TransportError),
    /// Complete the transfer but report only this many bytes
    Short(usize),
}

/// One transfer seen by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub request: RequestDescriptor,
    /// `wLength`
    pub length: usize,
    /// Data stage sent by the host (OUT transfers)
    pub data: Vec<u8>,
    pub result: Result<usize, TransportError>,
}

impl TransferRecord {
    /// Framing flags if this was an I2C_IO request
    pub fn i2c_flags(&self) -> Option<I2cFlags> {
        match Command::from_code(self.request.command) {
            Some(Command::I2cIo(flags)) => Some(flags),
            _ => None,
        }
    }

    pub fn is_i2c_io(&self) -> bool {
        self.i2c_flags().is_some()
    }
}

/// Transaction currently holding the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenTransaction {
    address: I2cAddress,
    direction: TransferDirection,
}

/// Emulated i2c-tiny-usb bridge
pub struct DummyBridge {
    config: DummyConfig,
    peripherals: BTreeMap<u8, Box<dyn Peripheral>>,
    status: StatusCode,
    delay_us: u16,
    open: Option<OpenTransaction>,
    log: Vec<TransferRecord>,
    faults: HashMap<usize, Fault>,
    disconnected: bool,
}

impl DummyBridge {
    /// Create a new bridge with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let mut bridge = Self {
            peripherals: BTreeMap::new(),
            status: StatusCode::IDLE,
            delay_us: 10,
            open: None,
            log: Vec::new(),
            faults: HashMap::new(),
            disconnected: false,
            config,
        };
        for addr in bridge.config.eeproms.clone() {
            bridge.attach(addr, Memory::eeprom_24c32());
        }
        for addr in bridge.config.rams.clone() {
            bridge.attach(addr, Memory::ram256());
        }
        bridge
    }

    /// Create a bridge with nothing on its bus
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Attach a peripheral, replacing any at the same address
    pub fn attach(&mut self, address: I2cAddress, peripheral: impl Peripheral + 'static) {
        self.peripherals.insert(address.get(), Box::new(peripheral));
    }

    /// Remove a peripheral from the bus
    pub fn detach(&mut self, address: I2cAddress) -> Option<Box<dyn Peripheral>> {
        self.peripherals.remove(&address.get())
    }

    /// Inject a fault into the transfer with this zero-based sequence
    /// number (the handshake is transfer 0)
    pub fn inject(&mut self, transfer: usize, fault: Fault) {
        self.faults.insert(transfer, fault);
    }

    /// Every transfer seen so far
    pub fn transfer_log(&self) -> &[TransferRecord] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Current SetDelay value
    pub fn delay_us(&self) -> u16 {
        self.delay_us
    }

    /// Set the status byte reported by GetStatus
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Whether a transaction is holding the bus (no stop seen yet)
    pub fn bus_busy(&self) -> bool {
        self.open.is_some()
    }

    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    fn stop(&mut self) {
        if let Some(open) = self.open.take() {
            if let Some(p) = self.peripherals.get_mut(&open.address.get()) {
                p.stop();
            }
        }
    }

    fn handle(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
    ) -> Result<usize, TransportError> {
        if request.request_type != RequestType::Vendor || request.recipient != Recipient::Device
        {
            return Err(TransportError::Stall);
        }
        if request.direction != data.direction() {
            return Err(TransportError::DirectionMismatch);
        }

        let command = Command::from_code(request.command).ok_or(TransportError::Stall)?;
        match (command, data) {
            (Command::Echo, DataStage::In(buf)) => {
                let mut reply = request.value.to_le_bytes();
                if self.config.broken_echo {
                    reply.swap(0, 1);
                }
                Ok(copy_reply(buf, &reply))
            }
            (Command::GetFunc, DataStage::In(buf)) => {
                Ok(copy_reply(buf, &self.config.func.to_le_bytes()))
            }
            (Command::GetStatus, DataStage::In(buf)) => Ok(copy_reply(buf, &[self.status.raw()])),
            (Command::SetDelay, DataStage::Out(_)) => {
                if request.value > self.config.max_delay_us {
                    return Err(TransportError::Stall);
                }
                self.delay_us = request.value;
                Ok(0)
            }
            (Command::I2cIo(flags), data) => self.i2c_io(request, flags, data),
            _ => Err(TransportError::Stall),
        }
    }

    fn i2c_io(
        &mut self,
        request: &RequestDescriptor,
        flags: I2cFlags,
        data: DataStage<'_>,
    ) -> Result<usize, TransportError> {
        if data.len() > self.config.max_transfer {
            return Err(TransportError::Stall);
        }
        let address = I2cAddress::try_from(request.index).map_err(|_| TransportError::Stall)?;
        let direction = TransferDirection::from_value(request.value);
        if direction.usb_direction() != data.direction() {
            return Err(TransportError::Stall);
        }

        let this = OpenTransaction { address, direction };
        let continues = !flags.contains(I2cFlags::BEGIN) && self.open == Some(this);

        if !continues {
            // (Repeated) start and address phase
            if let Some(open) = self.open {
                if open.address != address {
                    self.stop();
                }
            }
            match self.peripherals.get_mut(&address.get()) {
                Some(p) => {
                    p.start(direction);
                    self.status = StatusCode::ADDRESS_ACK;
                    self.open = Some(this);
                }
                None => {
                    log::debug!("dummy: NAK on {}", address);
                    self.status = StatusCode::ADDRESS_NACK;
                    self.open = None;
                    return Err(TransportError::Stall);
                }
            }
        }

        let len = data.len();
        if let Some(p) = self.peripherals.get_mut(&address.get()) {
            match data {
                DataStage::Out(bytes) => p.write(bytes),
                DataStage::In(buf) => p.read(buf),
            }
        }

        if flags.contains(I2cFlags::END) {
            self.stop();
        }

        Ok(len)
    }
}

fn copy_reply(buf: &mut [u8], reply: &[u8]) -> usize {
    let n = buf.len().min(reply.len());
    buf[..n].copy_from_slice(&reply[..n]);
    n
}

impl ControlTransport for DummyBridge {
    fn transfer(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
        _timeout: Duration,
    ) -> Result<usize, TransportError> {
        let seq = self.log.len();
        let length = data.len();
        let out = match &data {
            DataStage::Out(bytes) => bytes.to_vec(),
            DataStage::In(_) => Vec::new(),
        };

        let result = if self.disconnected {
            Err(TransportError::Disconnected)
        } else {
            match self.faults.remove(&seq) {
                Some(Fault::Error(e)) => {
                    if e == TransportError::Disconnected {
                        self.disconnected = true;
                        self.open = None;
                    }
                    Err(e)
                }
                Some(Fault::Short(n)) => self.handle(request, data).map(|len| len.min(n)),
                None => self.handle(request, data),
            }
        };

        self.log.push(TransferRecord {
            request: *request,
            length,
            data: out,
            result: result.clone(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2cusb_core::{DeviceError, DeviceSession, I2cBus, I2cError};

    fn addr(a: u8) -> I2cAddress {
        I2cAddress::new(a).unwrap()
    }

    #[test]
    fn test_echo_handshake() {
        let session = DeviceSession::open(DummyBridge::new_default()).unwrap();
        let bridge = session.close();
        assert_eq!(bridge.transfer_log().len(), 1);
        assert_eq!(bridge.transfer_log()[0].result, Ok(2));
    }

    #[test]
    fn test_broken_echo() {
        let config = DummyConfig {
            broken_echo: true,
            ..Default::default()
        };
        assert!(matches!(
            DeviceSession::open(DummyBridge::new(config)),
            Err(DeviceError::ProtocolMismatch { .. })
        ));
    }

    #[test]
    fn test_eeprom_roundtrip() {
        let mut bridge = DummyBridge::new_default();
        bridge.attach(addr(0x50), Memory::eeprom_24c32());
        let mut bus = I2cBus::new(DeviceSession::open(bridge).unwrap());

        bus.write(addr(0x50), &[0x00, 0x20, 1, 2, 3]).unwrap();
        let data = bus.write_then_read(addr(0x50), &[0x00, 0x20], 3).unwrap();
        assert_eq!(data, vec![1, 2, 3]);

        let bridge = bus.into_session().close();
        assert!(!bridge.bus_busy());
    }

    #[test]
    fn test_absent_address_sets_nack_status() {
        let mut bus = I2cBus::new(DeviceSession::open(DummyBridge::new_default()).unwrap());
        assert_eq!(bus.write(addr(0x50), &[]), Err(I2cError::NoAck(addr(0x50))));
        assert_eq!(
            bus.session_mut().get_status().unwrap(),
            StatusCode::ADDRESS_NACK
        );
    }

    #[test]
    fn test_parse_options() {
        let config =
            parse_options(&[("eeprom", "0x50+0x51"), ("ram", "0x68"), ("maxlen", "32")]).unwrap();
        assert_eq!(config.eeproms, vec![addr(0x50), addr(0x51)]);
        assert_eq!(config.rams, vec![addr(0x68)]);
        assert_eq!(config.max_transfer, 32);

        assert!(parse_options(&[("eeprom", "0x80")]).is_err());
        assert!(parse_options(&[("voltage", "3.3")]).is_err());
    }

    #[test]
    fn test_non_vendor_request_stalls() {
        let mut bridge = DummyBridge::new_default();
        let mut request = RequestDescriptor::vendor_in(0, 0x1234, 0);
        request.request_type = RequestType::Class;
        let mut buf = [0u8; 2];
        assert_eq!(
            bridge.transfer(&request, DataStage::In(&mut buf), Duration::from_secs(1)),
            Err(TransportError::Stall)
        );
    }
}
