//! List command implementation

/// List connected bridges
#[cfg(feature = "nusb")]
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let devices = i2cusb_nusb::NusbTransport::list_devices()?;

    if devices.is_empty() {
        println!(
            "No bridges found (looking for {:04x}:{:04x})",
            i2cusb_core::USB_VENDOR_ID,
            i2cusb_core::USB_PRODUCT_ID
        );
        return Ok(());
    }

    for (index, device) in devices.iter().enumerate() {
        println!("[{}] {}", index, device);
    }
    Ok(())
}

/// List connected bridges
#[cfg(not(feature = "nusb"))]
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    Err("USB support not compiled in (enable the \"nusb\" feature)".into())
}
