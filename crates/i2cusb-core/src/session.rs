//! Device session
//!
//! A [`DeviceSession`] owns the transport handle of one bridge. Opening a
//! session performs the echo handshake; only a session in
//! [`SessionState::Ready`] issues commands. A fatal transport fault (timeout,
//! disconnect, host failure) moves the session to [`SessionState::Closed`]
//! and every later call fails with [`DeviceError::SessionClosed`].

use core::fmt;
use std::time::Duration;

use bitflags::bitflags;

use crate::command::Command;
use crate::error::{DeviceError, Result, TransportError};
use crate::request::{Direction, RequestDescriptor};
use crate::transport::{ControlTransport, DataStage};

/// Echo value used by the handshake unless configured otherwise
pub const DEFAULT_PROBE: u16 = 0x1234;

/// Largest data stage the bridge firmware buffers per I2C_IO request
pub const DEFAULT_MAX_TRANSFER: usize = 64;

bitflags! {
    /// Capability word returned by GetFunc
    ///
    /// Uses the Linux `I2C_FUNC_*` bit layout. Unknown bits are kept.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FunctionBitmap: u32 {
        const I2C                    = 0x0000_0001;
        const TEN_BIT_ADDR           = 0x0000_0002;
        const PROTOCOL_MANGLING      = 0x0000_0004;
        const SMBUS_PEC              = 0x0000_0008;
        const NOSTART                = 0x0000_0010;
        const SLAVE                  = 0x0000_0020;
        const SMBUS_BLOCK_PROC_CALL  = 0x0000_8000;
        const SMBUS_QUICK            = 0x0001_0000;
        const SMBUS_READ_BYTE        = 0x0002_0000;
        const SMBUS_WRITE_BYTE       = 0x0004_0000;
        const SMBUS_READ_BYTE_DATA   = 0x0008_0000;
        const SMBUS_WRITE_BYTE_DATA  = 0x0010_0000;
        const SMBUS_READ_WORD_DATA   = 0x0020_0000;
        const SMBUS_WRITE_WORD_DATA  = 0x0040_0000;
        const SMBUS_PROC_CALL        = 0x0080_0000;
        const SMBUS_READ_BLOCK_DATA  = 0x0100_0000;
        const SMBUS_WRITE_BLOCK_DATA = 0x0200_0000;
        const SMBUS_READ_I2C_BLOCK   = 0x0400_0000;
        const SMBUS_WRITE_I2C_BLOCK  = 0x0800_0000;
        const SMBUS_HOST_NOTIFY      = 0x1000_0000;

        /// Everything SMBus emulation over plain I2C messages provides
        const SMBUS_EMUL = Self::SMBUS_QUICK.bits()
            | Self::SMBUS_READ_BYTE.bits()
            | Self::SMBUS_WRITE_BYTE.bits()
            | Self::SMBUS_READ_BYTE_DATA.bits()
            | Self::SMBUS_WRITE_BYTE_DATA.bits()
            | Self::SMBUS_READ_WORD_DATA.bits()
            | Self::SMBUS_WRITE_WORD_DATA.bits()
            | Self::SMBUS_PROC_CALL.bits()
            | Self::SMBUS_WRITE_BLOCK_DATA.bits()
            | Self::SMBUS_READ_I2C_BLOCK.bits()
            | Self::SMBUS_WRITE_I2C_BLOCK.bits()
            | Self::SMBUS_PEC.bits();
    }
}

/// Status byte returned by GetStatus
///
/// The value is passed through exactly as the device reported it. The
/// constants name the codes the known firmwares use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u8);

impl StatusCode {
    /// No I2C transfer since power-up
    pub const IDLE: StatusCode = StatusCode(0);
    /// Last address byte was acknowledged
    pub const ADDRESS_ACK: StatusCode = StatusCode(1);
    /// Last address byte was not acknowledged
    pub const ADDRESS_NACK: StatusCode = StatusCode(2);

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn is_address_nack(self) -> bool {
        self == Self::ADDRESS_NACK
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::IDLE => write!(f, "idle"),
            Self::ADDRESS_ACK => write!(f, "address ack"),
            Self::ADDRESS_NACK => write!(f, "address nack"),
            StatusCode(other) => write!(f, "unknown (0x{:02X})", other),
        }
    }
}

/// When the I2C engine consults GetStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCheck {
    /// Only after a stalled I2C_IO transfer, to tell a missing peripheral
    /// from other refusals
    #[default]
    OnFailure,
    /// After every I2C_IO transfer, for firmwares that report NACK only
    /// through the status byte
    EveryTransfer,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Value sent in the echo handshake
    pub probe: u16,
    /// Largest data stage per I2C_IO transfer
    pub max_transfer: usize,
    /// Per-transfer timeout (None = transport default)
    pub timeout: Option<Duration>,
    /// Clock delay to program right after the handshake
    pub delay_us: Option<u16>,
    pub status_check: StatusCheck,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            probe: DEFAULT_PROBE,
            max_transfer: DEFAULT_MAX_TRANSFER,
            timeout: None,
            delay_us: None,
            status_check: StatusCheck::OnFailure,
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Handshaking,
    Ready,
    Closed,
}

/// An open connection to one bridge
pub struct DeviceSession<T> {
    transport: T,
    config: SessionConfig,
    state: SessionState,
    timeout: Duration,
}

impl<T: ControlTransport> DeviceSession<T> {
    /// Open a session with the default configuration
    pub fn open(transport: T) -> Result<Self> {
        Self::open_with_config(transport, SessionConfig::default())
    }

    /// Open a session, verifying that the device speaks this protocol
    pub fn open_with_config(transport: T, config: SessionConfig) -> Result<Self> {
        let timeout = config
            .timeout
            .unwrap_or_else(|| transport.default_timeout());
        let mut session = Self {
            transport,
            config,
            state: SessionState::Unopened,
            timeout,
        };

        session.handshake()?;

        if let Some(delay) = session.config.delay_us {
            session.set_delay(delay)?;
        }

        Ok(session)
    }

    fn handshake(&mut self) -> Result<()> {
        self.state = SessionState::Handshaking;

        let probe = self.config.probe;
        let expected = probe.to_le_bytes();
        let mut buf = [0u8; 2];
        let request = Command::Echo.request(Direction::In, probe, 0);

        let len = match self.dispatch(&request, DataStage::In(&mut buf)) {
            Ok(len) => len,
            Err(DeviceError::Transport(e @ (TransportError::Stall | TransportError::Timeout))) => {
                self.state = SessionState::Closed;
                return Err(DeviceError::Unresponsive(e));
            }
            Err(e) => {
                self.state = SessionState::Closed;
                return Err(e);
            }
        };

        let len = len.min(buf.len());
        if buf[..len] != expected {
            self.state = SessionState::Closed;
            return Err(DeviceError::ProtocolMismatch {
                expected,
                actual: buf[..len].to_vec(),
            });
        }

        log::debug!("Echo handshake OK (0x{:04X})", probe);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Send an echo request and return the value the device reflected
    pub fn echo(&mut self, value: u16) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.command_in(Command::Echo, value, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read the capability word
    pub fn get_function_map(&mut self) -> Result<FunctionBitmap> {
        let mut buf = [0u8; 4];
        self.command_in(Command::GetFunc, 0, &mut buf)?;
        let func = FunctionBitmap::from_bits_retain(u32::from_le_bytes(buf));
        log::debug!("Function map: 0x{:08X}", func.bits());
        Ok(func)
    }

    /// Program the I2C clock delay in microseconds
    pub fn set_delay(&mut self, microseconds: u16) -> Result<()> {
        let request = Command::SetDelay.request(Direction::Out, microseconds, 0);
        match self.control(&request, DataStage::Out(&[])) {
            Err(DeviceError::Transport(TransportError::Stall)) => Err(DeviceError::DeviceRejected {
                command: Command::SetDelay,
                value: microseconds,
            }),
            Err(e) => Err(e),
            Ok(_) => {
                log::debug!("Set delay to {} us", microseconds);
                Ok(())
            }
        }
    }

    /// Read the status byte of the last I2C operation
    pub fn get_status(&mut self) -> Result<StatusCode> {
        let mut buf = [0u8; 1];
        self.command_in(Command::GetStatus, 0, &mut buf)?;
        Ok(StatusCode(buf[0]))
    }

    /// IN command with a fixed-size response
    fn command_in(&mut self, command: Command, value: u16, buf: &mut [u8]) -> Result<()> {
        let request = command.request(Direction::In, value, 0);
        let expected = buf.len();
        match self.control(&request, DataStage::In(buf)) {
            Ok(len) if len == expected => Ok(()),
            Ok(len) => Err(DeviceError::ShortResponse {
                command,
                expected,
                actual: len,
            }),
            Err(DeviceError::Transport(TransportError::Stall)) => {
                Err(DeviceError::DeviceRejected { command, value })
            }
            Err(e) => Err(e),
        }
    }

    /// Run a control transfer on a ready session
    pub(crate) fn control(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
    ) -> Result<usize> {
        if self.state != SessionState::Ready {
            return Err(DeviceError::SessionClosed);
        }
        self.dispatch(request, data)
    }

    /// Run a control transfer regardless of state
    ///
    /// Used for the bus-release transfer after a failed transaction, which
    /// is attempted even when the failure closed the session.
    pub(crate) fn dispatch(
        &mut self,
        request: &RequestDescriptor,
        data: DataStage<'_>,
    ) -> Result<usize> {
        log::debug!(
            "Control {:?}: bRequest=0x{:02X} wValue=0x{:04X} wIndex=0x{:04X} wLength={}",
            request.direction,
            request.command,
            request.value,
            request.index,
            data.len()
        );
        if let DataStage::Out(bytes) = &data {
            if !bytes.is_empty() {
                log::trace!("  out: {:02X?}", bytes);
            }
        }

        match self.transport.transfer(request, data, self.timeout) {
            Ok(len) => Ok(len),
            Err(e) => {
                if e.is_fatal() && self.state != SessionState::Closed {
                    log::warn!("Closing session after transport fault: {}", e);
                    self.state = SessionState::Closed;
                }
                Err(DeviceError::Transport(e))
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Per-transfer timeout in effect
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Release the transport handle, ending the session
    pub fn close(self) -> T {
        self.transport
    }
}
