//! I2C transaction engine
//!
//! Each I2C_IO control transfer moves at most `max_transfer` bytes, so a
//! logical transaction is split into a sequence of transfers:
//!
//! ```text
//! write 150 bytes, max 64:   [BEGIN] 64   [-] 64   [END] 22
//! write 0 bytes (presence):  [BEGIN|END] 0
//! write 2, then read 10:     [BEGIN] 2 (out)   [END] 10 (in)
//! ```
//!
//! BEGIN appears only on the first transfer of a transaction and END only
//! on the last. A write followed by a read without END in between is a
//! repeated start: the bus is never released between the two phases.
//!
//! When a transfer fails, the engine issues a zero-length END transfer to
//! release the bus, then reports the original error. This holds for the
//! transfer carrying END as well, since its stop was never applied. A NACK
//! is the exception: the firmware already sent the stop. A failed release
//! is logged and otherwise ignored.

use core::ops::RangeInclusive;

use crate::address::I2cAddress;
use crate::command::{Command, I2cFlags, TransferDirection};
use crate::error::{DeviceError, I2cError, TransportError};
use crate::request::Direction;
use crate::session::{DeviceSession, StatusCheck};
use crate::transport::{ControlTransport, DataStage};

/// Result type for I2C operations
pub type Result<T> = core::result::Result<T, I2cError>;

/// Payload of one logical transaction phase
enum Payload<'a> {
    Write(&'a [u8]),
    Read(&'a mut [u8]),
}

impl Payload<'_> {
    fn len(&self) -> usize {
        match self {
            Payload::Write(data) => data.len(),
            Payload::Read(buf) => buf.len(),
        }
    }

    fn direction(&self) -> TransferDirection {
        match self {
            Payload::Write(_) => TransferDirection::Write,
            Payload::Read(_) => TransferDirection::Read,
        }
    }
}

/// Flags for transfer `i` of `count` within a phase framed by `framing`
fn fragment_flags(i: usize, count: usize, framing: I2cFlags) -> I2cFlags {
    let mut flags = I2cFlags::empty();
    if i == 0 && framing.contains(I2cFlags::BEGIN) {
        flags |= I2cFlags::BEGIN;
    }
    if i + 1 == count && framing.contains(I2cFlags::END) {
        flags |= I2cFlags::END;
    }
    flags
}

/// Number of transfers needed for `len` bytes; a zero-length phase still
/// takes one transfer to carry its flags
fn fragment_count(len: usize, max_transfer: usize) -> usize {
    len.div_ceil(max_transfer).max(1)
}

/// Whether a failed transfer can have left a transaction open
///
/// A NACK makes the firmware send the stop itself, and a closed session
/// never reached the device.
fn may_hold_bus(e: &I2cError) -> bool {
    !matches!(
        e,
        I2cError::NoAck(_) | I2cError::Device(DeviceError::SessionClosed)
    )
}

/// I2C master on top of a [`DeviceSession`]
///
/// The bus owns its session, so two transactions can never interleave.
pub struct I2cBus<T> {
    session: DeviceSession<T>,
}

impl<T: ControlTransport> I2cBus<T> {
    pub fn new(session: DeviceSession<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &DeviceSession<T> {
        &self.session
    }

    /// Access to device-level commands (set_delay, get_status, ...)
    pub fn session_mut(&mut self) -> &mut DeviceSession<T> {
        &mut self.session
    }

    pub fn into_session(self) -> DeviceSession<T> {
        self.session
    }

    /// Largest data stage per transfer
    fn max_transfer(&self) -> usize {
        self.session.config().max_transfer.max(1)
    }

    /// Write `bytes` to `address` as one complete transaction
    pub fn write(&mut self, address: I2cAddress, bytes: &[u8]) -> Result<()> {
        self.run_phase(
            address,
            Payload::Write(bytes),
            I2cFlags::BEGIN | I2cFlags::END,
        )
    }

    /// Read `length` bytes from `address` as one complete transaction
    pub fn read(&mut self, address: I2cAddress, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        self.read_into(address, &mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` from `address` as one complete transaction
    pub fn read_into(&mut self, address: I2cAddress, buf: &mut [u8]) -> Result<()> {
        self.run_phase(address, Payload::Read(buf), I2cFlags::BEGIN | I2cFlags::END)
    }

    /// Write then read with a repeated start in between
    pub fn write_then_read(
        &mut self,
        address: I2cAddress,
        write_bytes: &[u8],
        read_length: usize,
    ) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; read_length];
        self.write_read_into(address, write_bytes, &mut buf)?;
        Ok(buf)
    }

    /// Slice form of [`write_then_read`](Self::write_then_read)
    pub fn write_read_into(
        &mut self,
        address: I2cAddress,
        write_bytes: &[u8],
        buf: &mut [u8],
    ) -> Result<()> {
        self.run_phase(address, Payload::Write(write_bytes), I2cFlags::BEGIN)?;
        self.run_phase(address, Payload::Read(buf), I2cFlags::END)
    }

    /// Presence check: a zero-length write with BEGIN|END
    ///
    /// Returns `false` when nothing acknowledges the address. Every other
    /// failure is returned as an error.
    pub fn probe(&mut self, address: I2cAddress) -> Result<bool> {
        match self.write(address, &[]) {
            Ok(()) => Ok(true),
            Err(I2cError::NoAck(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Probe every address in `range` and return those that answered
    ///
    /// Both bounds must be valid 7-bit addresses.
    pub fn scan(&mut self, range: RangeInclusive<u8>) -> Result<Vec<I2cAddress>> {
        I2cAddress::new(*range.start())?;
        I2cAddress::new(*range.end())?;

        let mut found = Vec::new();
        for raw in range {
            let address = I2cAddress::new(raw)?;
            if self.probe(address)? {
                log::debug!("Device found at {}", address);
                found.push(address);
            }
        }
        Ok(found)
    }

    fn run_phase(
        &mut self,
        address: I2cAddress,
        mut payload: Payload<'_>,
        framing: I2cFlags,
    ) -> Result<()> {
        let max = self.max_transfer();
        let total = payload.len();
        let direction = payload.direction();
        let count = fragment_count(total, max);

        for i in 0..count {
            let start = i * max;
            let end = (start + max).min(total);
            let flags = fragment_flags(i, count, framing);

            let data = match &mut payload {
                Payload::Write(bytes) => DataStage::Out(&bytes[start..end]),
                Payload::Read(buf) => DataStage::In(&mut buf[start..end]),
            };

            if let Err(e) = self.io(address, direction, flags, data) {
                if may_hold_bus(&e) {
                    self.release_bus(address);
                }
                return Err(e);
            }
        }

        Ok(())
    }

    /// One I2C_IO control transfer
    fn io(
        &mut self,
        address: I2cAddress,
        direction: TransferDirection,
        flags: I2cFlags,
        data: DataStage<'_>,
    ) -> Result<()> {
        let expected = data.len();
        let request = Command::I2cIo(flags).request(
            direction.usb_direction(),
            direction.value(),
            address.index(),
        );

        match self.session.control(&request, data) {
            Ok(len) if len == expected => {}
            Ok(len) => {
                return Err(I2cError::Truncated {
                    address,
                    expected,
                    actual: len,
                })
            }
            Err(DeviceError::Transport(TransportError::Stall)) => {
                return Err(self.classify_stall(address))
            }
            Err(e) => return Err(e.into()),
        }

        if self.session.config().status_check == StatusCheck::EveryTransfer {
            let status = self.session.get_status()?;
            if status.is_address_nack() {
                return Err(I2cError::NoAck(address));
            }
        }

        Ok(())
    }

    /// Work out why an I2C_IO transfer stalled
    fn classify_stall(&mut self, address: I2cAddress) -> I2cError {
        match self.session.get_status() {
            Ok(status) if status.is_address_nack() => I2cError::NoAck(address),
            Ok(status) => {
                log::debug!("I2C_IO at {} stalled with status {}", address, status);
                I2cError::Bus { address, status }
            }
            // Status unavailable; the stall is the only signal
            Err(DeviceError::DeviceRejected { .. }) => I2cError::NoAck(address),
            Err(e) => e.into(),
        }
    }

    /// Best-effort stop condition after an abandoned transaction
    fn release_bus(&mut self, address: I2cAddress) {
        let request = Command::I2cIo(I2cFlags::END).request(
            Direction::Out,
            TransferDirection::Write.value(),
            address.index(),
        );
        match self.session.dispatch(&request, DataStage::Out(&[])) {
            Ok(_) => log::debug!("Released bus after failed transfer to {}", address),
            Err(e) => log::warn!("Failed to release I2C bus after error at {}: {}", address, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CMD_GET_STATUS, CMD_I2C_IO, I2C_M_RD};
    use crate::error::InvalidAddress;
    use crate::session::{SessionConfig, SessionState, StatusCode, DEFAULT_PROBE};
    use crate::transport::mock::{MockTransport, Record, Reply};
    use proptest::prelude::*;

    const EEPROM: u8 = 0x50;

    fn addr(a: u8) -> I2cAddress {
        I2cAddress::new(a).unwrap()
    }

    fn bus_with(transport: MockTransport, max_transfer: usize) -> I2cBus<MockTransport> {
        let config = SessionConfig {
            max_transfer,
            ..Default::default()
        };
        I2cBus::new(DeviceSession::open_with_config(transport, config).unwrap())
    }

    fn bus(transport: MockTransport) -> I2cBus<MockTransport> {
        bus_with(transport, 64)
    }

    fn transfers(bus: I2cBus<MockTransport>) -> Vec<Record> {
        bus.into_session().close().after_handshake().to_vec()
    }

    fn flags_of(record: &Record) -> I2cFlags {
        assert_eq!(record.request.command & !0x03, CMD_I2C_IO);
        I2cFlags::from_bits_truncate(record.request.command)
    }

    #[test]
    fn test_single_write() {
        let mut bus = bus(MockTransport::with_echo(DEFAULT_PROBE));
        bus.write(addr(EEPROM), &[0x00, 0x20, 0xAA]).unwrap();

        let log = transfers(bus);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].request.request_type_byte(), 0x40);
        assert_eq!(log[0].request.command, 7);
        assert_eq!(log[0].request.value, 0);
        assert_eq!(log[0].request.index, 0x50);
        assert_eq!(log[0].out, vec![0x00, 0x20, 0xAA]);
    }

    #[test]
    fn test_fragmented_write() {
        let data: Vec<u8> = (0..150).map(|i| i as u8).collect();
        let mut bus = bus(MockTransport::with_echo(DEFAULT_PROBE));
        bus.write(addr(EEPROM), &data).unwrap();

        let log = transfers(bus);
        assert_eq!(log.len(), 3);
        assert_eq!(flags_of(&log[0]), I2cFlags::BEGIN);
        assert_eq!(flags_of(&log[1]), I2cFlags::empty());
        assert_eq!(flags_of(&log[2]), I2cFlags::END);
        assert_eq!(log[0].length, 64);
        assert_eq!(log[1].length, 64);
        assert_eq!(log[2].length, 22);

        let sent: Vec<u8> = log.iter().flat_map(|r| r.out.clone()).collect();
        assert_eq!(sent, data);
        assert!(log.iter().all(|r| r.request.index == 0x50));
    }

    #[test]
    fn test_fragmented_read() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Data(vec![1; 64]));
        transport.push(Reply::Data(vec![2; 6]));
        let mut bus = bus(transport);
        let data = bus.read(addr(EEPROM), 70).unwrap();
        assert_eq!(&data[..64], &[1; 64][..]);
        assert_eq!(&data[64..], &[2; 6][..]);

        let log = transfers(bus);
        assert_eq!(log.len(), 2);
        assert_eq!(flags_of(&log[0]), I2cFlags::BEGIN);
        assert_eq!(flags_of(&log[1]), I2cFlags::END);
        for record in &log {
            assert_eq!(record.request.direction, Direction::In);
            assert_eq!(record.request.value, I2C_M_RD);
        }
    }

    #[test]
    fn test_presence_check_flags() {
        let mut bus = bus(MockTransport::with_echo(DEFAULT_PROBE));
        assert!(bus.probe(addr(0x18)).unwrap());

        let log = transfers(bus);
        assert_eq!(log.len(), 1);
        assert_eq!(flags_of(&log[0]), I2cFlags::BEGIN | I2cFlags::END);
        assert_eq!(log[0].length, 0);
    }

    #[test]
    fn test_presence_check_no_ack() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Data(vec![StatusCode::ADDRESS_NACK.raw()]));
        let mut bus = bus(transport);

        assert_eq!(bus.write(addr(0x51), &[]), Err(I2cError::NoAck(addr(0x51))));
        assert!(bus.session().is_ready());

        // The firmware stops the bus itself after a NACK
        let log = transfers(bus);
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].request.command, CMD_GET_STATUS);
    }

    #[test]
    fn test_probe_maps_no_ack_to_false() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Fail(TransportError::Stall));
        let mut bus = bus(transport);
        // Status unavailable as well: still a missing peripheral
        assert!(!bus.probe(addr(0x51)).unwrap());
    }

    #[test]
    fn test_probe_propagates_transport_fault() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Fail(TransportError::Disconnected));
        let mut bus = bus(transport);
        assert_eq!(
            bus.probe(addr(0x51)),
            Err(I2cError::Device(DeviceError::Transport(
                TransportError::Disconnected
            )))
        );
        assert_eq!(bus.session().state(), SessionState::Closed);
    }

    #[test]
    fn test_stall_with_other_status() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Data(vec![StatusCode::ADDRESS_ACK.raw()]));
        let mut bus = bus(transport);
        assert_eq!(
            bus.write(addr(EEPROM), &[0]),
            Err(I2cError::Bus {
                address: addr(EEPROM),
                status: StatusCode::ADDRESS_ACK
            })
        );
    }

    #[test]
    fn test_eeprom_pointer_then_read() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Full);
        transport.push(Reply::Data((0x20..0x2A).collect()));
        let mut bus = bus(transport);

        let data = bus.write_then_read(addr(EEPROM), &[0x00, 0x20], 10).unwrap();
        assert_eq!(data, (0x20..0x2A).collect::<Vec<u8>>());

        let log = transfers(bus);
        assert_eq!(log.len(), 2);
        assert_eq!(flags_of(&log[0]), I2cFlags::BEGIN);
        assert_eq!(log[0].request.direction, Direction::Out);
        assert_eq!(log[0].out, vec![0x00, 0x20]);
        assert_eq!(flags_of(&log[1]), I2cFlags::END);
        assert_eq!(log[1].request.direction, Direction::In);
        assert_eq!(log[1].request.value, I2C_M_RD);
        assert_eq!(log[1].length, 10);
    }

    #[test]
    fn test_failed_middle_fragment_releases_bus() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Full);
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Data(vec![StatusCode::ADDRESS_ACK.raw()]));
        let mut bus = bus_with(transport, 4);

        let result = bus.write(addr(EEPROM), &[0; 12]);
        assert_eq!(
            result,
            Err(I2cError::Bus {
                address: addr(EEPROM),
                status: StatusCode::ADDRESS_ACK
            })
        );

        let log = transfers(bus);
        assert_eq!(log.len(), 4);
        assert_eq!(flags_of(&log[0]), I2cFlags::BEGIN);
        assert_eq!(flags_of(&log[1]), I2cFlags::empty());
        assert_eq!(log[2].request.command, CMD_GET_STATUS);
        // Zero-length stop to the same address
        assert_eq!(flags_of(&log[3]), I2cFlags::END);
        assert_eq!(log[3].length, 0);
        assert_eq!(log[3].request.index, 0x50);
    }

    #[test]
    fn test_failed_end_transfer_releases_bus() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Full);
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Data(vec![StatusCode::ADDRESS_ACK.raw()]));
        let mut bus = bus(transport);

        assert!(bus.write_then_read(addr(EEPROM), &[0x00, 0x20], 4).is_err());

        let log = transfers(bus);
        assert_eq!(log.len(), 4);
        assert_eq!(flags_of(&log[1]), I2cFlags::END);
        assert_eq!(log[1].request.direction, Direction::In);
        assert_eq!(log[2].request.command, CMD_GET_STATUS);
        assert_eq!(flags_of(&log[3]), I2cFlags::END);
        assert_eq!(log[3].request.direction, Direction::Out);
        assert_eq!(log[3].length, 0);
    }

    #[test]
    fn test_no_ack_on_write_phase_skips_release() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Data(vec![StatusCode::ADDRESS_NACK.raw()]));
        let mut bus = bus(transport);

        let err = bus.write_then_read(addr(0x51), &[0x00], 2).unwrap_err();
        assert!(err.is_no_ack());

        let log = transfers(bus);
        assert_eq!(log.len(), 2);
        assert_eq!(flags_of(&log[0]), I2cFlags::BEGIN);
        assert_eq!(log[1].request.command, CMD_GET_STATUS);
    }

    #[test]
    fn test_truncated_read_releases_bus() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Short(3));
        let mut bus = bus_with(transport, 8);

        assert_eq!(
            bus.read(addr(EEPROM), 16),
            Err(I2cError::Truncated {
                address: addr(EEPROM),
                expected: 8,
                actual: 3
            })
        );

        let log = transfers(bus);
        assert_eq!(log.len(), 2);
        assert_eq!(flags_of(&log[1]), I2cFlags::END);
        assert_eq!(log[1].request.direction, Direction::Out);
    }

    #[test]
    fn test_timeout_closes_session_after_release_attempt() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Fail(TransportError::Timeout));
        transport.push(Reply::Fail(TransportError::Timeout));
        let mut bus = bus(transport);

        assert_eq!(
            bus.write_then_read(addr(EEPROM), &[0x00], 4),
            Err(I2cError::from(TransportError::Timeout))
        );
        assert_eq!(bus.session().state(), SessionState::Closed);
        assert_eq!(
            bus.write(addr(EEPROM), &[]),
            Err(I2cError::Device(DeviceError::SessionClosed))
        );

        let log = transfers(bus);
        assert_eq!(log.len(), 2);
        assert_eq!(flags_of(&log[1]), I2cFlags::END);
    }

    #[test]
    fn test_status_check_every_transfer() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Full);
        transport.push(Reply::Data(vec![StatusCode::ADDRESS_NACK.raw()]));
        let config = SessionConfig {
            status_check: StatusCheck::EveryTransfer,
            ..Default::default()
        };
        let mut bus = I2cBus::new(DeviceSession::open_with_config(transport, config).unwrap());
        assert!(!bus.probe(addr(0x22)).unwrap());
    }

    #[test]
    fn test_scan() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        // 0x08 absent, 0x09 present, 0x0A absent
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Data(vec![2]));
        transport.push(Reply::Full);
        transport.push(Reply::Fail(TransportError::Stall));
        transport.push(Reply::Data(vec![2]));
        let mut bus = bus(transport);
        assert_eq!(bus.scan(0x08..=0x0A).unwrap(), vec![addr(0x09)]);
    }

    #[test]
    fn test_scan_rejects_out_of_range_bound() {
        let mut bus = bus(MockTransport::with_echo(DEFAULT_PROBE));
        assert_eq!(
            bus.scan(0x70..=0xFF),
            Err(I2cError::InvalidAddress(InvalidAddress(0xFF)))
        );
        assert!(transfers(bus).is_empty());
    }

    #[test]
    fn test_closed_session_sends_nothing() {
        let mut transport = MockTransport::with_echo(DEFAULT_PROBE);
        transport.push(Reply::Fail(TransportError::Disconnected));
        let mut bus = bus(transport);
        assert!(bus.read(addr(EEPROM), 2).is_err());

        assert_eq!(
            bus.write(addr(EEPROM), &[1]),
            Err(I2cError::Device(DeviceError::SessionClosed))
        );
        // The failed read and its release attempt only
        assert_eq!(transfers(bus).len(), 2);
    }

    #[test]
    fn test_fragment_flags() {
        let both = I2cFlags::BEGIN | I2cFlags::END;
        assert_eq!(fragment_flags(0, 1, both), both);
        assert_eq!(fragment_flags(0, 1, I2cFlags::BEGIN), I2cFlags::BEGIN);
        assert_eq!(fragment_flags(0, 3, both), I2cFlags::BEGIN);
        assert_eq!(fragment_flags(1, 3, both), I2cFlags::empty());
        assert_eq!(fragment_flags(2, 3, both), I2cFlags::END);
        assert_eq!(fragment_flags(0, 2, I2cFlags::END), I2cFlags::empty());
    }

    proptest! {
        #[test]
        fn prop_write_fragmentation(len in 0usize..400, max in 1usize..80) {
            let data = vec![0xA5u8; len];
            let mut bus = bus_with(MockTransport::with_echo(DEFAULT_PROBE), max);
            bus.write(addr(EEPROM), &data).unwrap();
            let log = transfers(bus);

            prop_assert_eq!(log.len(), len.div_ceil(max).max(1));
            let last = log.len() - 1;
            for (i, record) in log.iter().enumerate() {
                let flags = flags_of(record);
                prop_assert_eq!(flags.contains(I2cFlags::BEGIN), i == 0);
                prop_assert_eq!(flags.contains(I2cFlags::END), i == last);
                prop_assert!(record.length <= max);
            }
            prop_assert_eq!(log.iter().map(|r| r.length).sum::<usize>(), len);
        }

        #[test]
        fn prop_read_fragmentation(len in 0usize..400, max in 1usize..80) {
            let mut bus = bus_with(MockTransport::with_echo(DEFAULT_PROBE), max);
            prop_assert_eq!(bus.read(addr(EEPROM), len).unwrap().len(), len);
            let log = transfers(bus);

            prop_assert_eq!(log.len(), len.div_ceil(max).max(1));
            let last = log.len() - 1;
            for (i, record) in log.iter().enumerate() {
                let flags = flags_of(record);
                prop_assert_eq!(flags.contains(I2cFlags::BEGIN), i == 0);
                prop_assert_eq!(flags.contains(I2cFlags::END), i == last);
                prop_assert_eq!(record.request.value, I2C_M_RD);
            }
        }

        #[test]
        fn prop_repeated_start_never_stops_between_phases(
            wlen in 0usize..200,
            rlen in 0usize..200,
            max in 1usize..70,
        ) {
            let mut bus = bus_with(MockTransport::with_echo(DEFAULT_PROBE), max);
            bus.write_then_read(addr(EEPROM), &vec![0; wlen], rlen).unwrap();
            let log = transfers(bus);

            let writes = wlen.div_ceil(max).max(1);
            let reads = rlen.div_ceil(max).max(1);
            prop_assert_eq!(log.len(), writes + reads);

            let flags: Vec<I2cFlags> = log.iter().map(flags_of).collect();
            prop_assert_eq!(flags.iter().filter(|f| f.contains(I2cFlags::BEGIN)).count(), 1);
            prop_assert_eq!(flags.iter().filter(|f| f.contains(I2cFlags::END)).count(), 1);
            prop_assert!(flags[0].contains(I2cFlags::BEGIN));
            prop_assert!(flags[flags.len() - 1].contains(I2cFlags::END));
            for record in &log[..writes] {
                prop_assert_eq!(record.request.direction, Direction::Out);
            }
            for record in &log[writes..] {
                prop_assert_eq!(record.request.direction, Direction::In);
            }
        }
    }
}
