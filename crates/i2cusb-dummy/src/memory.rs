//! Emulated I2C memories
//!
//! Covers the two access patterns of common parts: 24Cxx EEPROMs with a
//! 16-bit word address and RAM/register devices (PCF8583, MCP9808) with an
//! 8-bit register pointer.

use i2cusb_core::TransferDirection;

use crate::Peripheral;

/// Pointer-addressed memory
///
/// A write transaction starts with `address_width` pointer bytes (MSB
/// first); further bytes are stored at the pointer, which auto-increments
/// and wraps at the end of the memory. Reads continue from the pointer.
#[derive(Debug, Clone)]
pub struct Memory {
    data: Vec<u8>,
    address_width: usize,
    pointer: usize,
    /// Pointer bytes still expected in the current write
    pending_address: usize,
}

impl Memory {
    /// Create a memory of `size` bytes filled with 0xFF
    pub fn new(size: usize, address_width: usize) -> Self {
        Self {
            data: vec![0xFF; size.max(1)],
            address_width,
            pointer: 0,
            pending_address: 0,
        }
    }

    /// 24C32: 4 KiB, 16-bit word address
    pub fn eeprom_24c32() -> Self {
        Self::new(4096, 2)
    }

    /// 256 byte register file with an 8-bit pointer
    pub fn ram256() -> Self {
        Self::new(256, 1)
    }

    pub fn with_data(mut self, offset: usize, bytes: &[u8]) -> Self {
        for (i, &b) in bytes.iter().enumerate() {
            let idx = (offset + i) % self.data.len();
            self.data[idx] = b;
        }
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    fn advance(&mut self) {
        self.pointer = (self.pointer + 1) % self.data.len();
    }
}

impl Peripheral for Memory {
    fn start(&mut self, direction: TransferDirection) {
        self.pending_address = match direction {
            TransferDirection::Write => self.address_width,
            TransferDirection::Read => 0,
        };
        if self.pending_address > 0 {
            self.pointer = 0;
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if self.pending_address > 0 {
                self.pointer = ((self.pointer << 8) | b as usize) % self.data.len();
                self.pending_address -= 1;
            } else {
                self.data[self.pointer] = b;
                self.advance();
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        for b in buf {
            *b = self.data[self.pointer];
            self.advance();
        }
    }
}
