//! Bus transfer commands

use std::fmt::Write;

use i2cusb_core::{ControlTransport, I2cAddress, I2cBus};

/// Read `length` bytes and print them as a hex dump
pub fn run_read<T: ControlTransport>(
    bus: &mut I2cBus<T>,
    address: I2cAddress,
    length: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = bus.read(address, length)?;
    print!("{}", hex_dump(&data));
    Ok(())
}

/// Write bytes to a peripheral
pub fn run_write<T: ControlTransport>(
    bus: &mut I2cBus<T>,
    address: I2cAddress,
    bytes: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    bus.write(address, bytes)?;
    log::info!("Wrote {} byte(s) to {}", bytes.len(), address);
    Ok(())
}

/// Write bytes, then read `length` bytes after a repeated start
pub fn run_write_read<T: ControlTransport>(
    bus: &mut I2cBus<T>,
    address: I2cAddress,
    bytes: &[u8],
    length: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = bus.write_then_read(address, bytes, length)?;
    print!("{}", hex_dump(&data));
    Ok(())
}

/// Format bytes as `offset: hex  |ascii|` lines of 16
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        let _ = write!(out, "{:04x}:", i * 16);
        for b in chunk {
            let _ = write!(out, " {:02x}", b);
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        out.push_str("  |");
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}
