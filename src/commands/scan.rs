//! Scan command implementation

use std::fmt::Write;

use i2cusb_core::{ControlTransport, I2cAddress, I2cBus};

/// Probe `first..=last` and print an i2cdetect-style grid
pub fn run_scan<T: ControlTransport>(
    bus: &mut I2cBus<T>,
    first: u8,
    last: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    if first > last || last > I2cAddress::MAX {
        return Err(format!("Invalid scan range 0x{:02x}-0x{:02x}", first, last).into());
    }

    log::info!("Scanning 0x{:02x}-0x{:02x}", first, last);
    let found = bus.scan(first..=last)?;

    print!("{}", format_grid(first, last, &found));
    log::info!("{} device(s) found", found.len());
    Ok(())
}

/// Render the presence grid, 16 addresses per row
///
/// Addresses outside the range are blank, absent ones `--`, and present
/// ones show their hex value.
pub fn format_grid(first: u8, last: u8, found: &[I2cAddress]) -> String {
    let mut out = String::from("    ");
    for col in 0..16 {
        let _ = write!(out, "  {:x}", col);
    }
    out.push('\n');

    for row in (0..=I2cAddress::MAX).step_by(16) {
        let _ = write!(out, "{:02x}:", row);
        for raw in row..row + 16 {
            if raw < first || raw > last {
                out.push_str("   ");
            } else if found.iter().any(|a| a.get() == raw) {
                let _ = write!(out, " {:02x}", raw);
            } else {
                out.push_str(" --");
            }
        }
        out.push('\n');
    }
    out
}
