//! Device-level commands

use i2cusb_core::{ControlTransport, DeviceSession, FunctionBitmap};

/// Print the capability word and the status byte
pub fn run_info<T: ControlTransport>(
    session: &mut DeviceSession<T>,
) -> Result<(), Box<dyn std::error::Error>> {
    let func = session.get_function_map()?;
    let status = session.get_status()?;

    println!("Functionality: 0x{:08x}", func.bits());
    for (name, _) in func.iter_names() {
        println!("  {}", name);
    }
    let unknown = func.bits() & !FunctionBitmap::all().bits();
    if unknown != 0 {
        println!("  unknown bits 0x{:08x}", unknown);
    }
    println!("Status:        {} ({})", status.raw(), status);
    println!(
        "Max transfer:  {} bytes, timeout {} ms",
        session.config().max_transfer,
        session.timeout().as_millis()
    );
    Ok(())
}

/// Print the status byte
pub fn run_status<T: ControlTransport>(
    session: &mut DeviceSession<T>,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = session.get_status()?;
    println!("{} ({})", status.raw(), status);
    Ok(())
}

/// Program the I2C clock delay
pub fn run_set_delay<T: ControlTransport>(
    session: &mut DeviceSession<T>,
    microseconds: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    session.set_delay(microseconds)?;
    log::info!("I2C clock delay set to {} us", microseconds);
    Ok(())
}
