//! Adapter registration and dispatch
//!
//! This module provides a registry of the transports compiled into the
//! binary and opens one from an `adapter[:key=value,...]` string.

use i2cusb_core::{ControlTransport, DeviceSession, I2cBus, SessionConfig};

/// A transport picked at runtime
pub type BoxedTransport = Box<dyn ControlTransport>;

/// Information about an adapter
pub struct AdapterInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available adapters (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_adapters() -> Vec<AdapterInfo> {
    let mut adapters = Vec::new();

    #[cfg(feature = "nusb")]
    adapters.push(AdapterInfo {
        name: "nusb",
        aliases: &["usb"],
        description: "USB bridge (index=<n>,serial=<s>,vid=<id>,pid=<id>,timeout=<ms>)",
    });

    #[cfg(feature = "dummy")]
    adapters.push(AdapterInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory bridge emulator (eeprom=<a+b>,ram=<a>,maxlen=<n>)",
    });

    adapters
}

/// Generate help text listing all available adapters
pub fn adapter_help() -> String {
    let adapters = available_adapters();

    if adapters.is_empty() {
        return "No adapters available (recompile with adapter features enabled)".to_string();
    }

    let mut help = String::from("Available adapters:\n");
    for a in &adapters {
        help.push_str(&format!("  {:8} - {}\n", a.name, a.description));
    }
    help
}

/// Generate a short list of adapter names for CLI help
pub fn adapter_names_short() -> String {
    let adapters = available_adapters();
    let names: Vec<&str> = adapters.iter().map(|a| a.name).collect();
    names.join(", ")
}

/// Resolve a name or alias to the canonical adapter name
pub fn find_adapter(name: &str) -> Option<&'static str> {
    available_adapters()
        .into_iter()
        .find(|a| a.name == name || a.aliases.contains(&name))
        .map(|a| a.name)
}

/// Parse an adapter string into name and options
///
/// Format: "name" or "name:key1=value1,key2=value2"
pub fn parse_adapter_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

fn unknown_adapter_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown adapter: {}\n\n", name);
    msg.push_str(&adapter_help());
    msg.into()
}

/// Open the transport named by an adapter string
#[allow(unused_variables)]
pub fn open_transport(device: &str) -> Result<BoxedTransport, Box<dyn std::error::Error>> {
    let (name, options) = parse_adapter_string(device);

    let canonical = find_adapter(name).ok_or_else(|| unknown_adapter_error(name))?;

    match canonical {
        #[cfg(feature = "nusb")]
        "nusb" => {
            let config = i2cusb_nusb::parse_options(&options)?;
            Ok(Box::new(i2cusb_nusb::NusbTransport::open_with_config(
                config,
            )?))
        }
        #[cfg(feature = "dummy")]
        "dummy" => {
            let config = i2cusb_dummy::parse_options(&options)?;
            log::info!(
                "Using dummy bridge with {} EEPROM(s) and {} RAM device(s)",
                config.eeproms.len(),
                config.rams.len()
            );
            Ok(Box::new(i2cusb_dummy::DummyBridge::new(config)))
        }
        _ => Err(unknown_adapter_error(name)),
    }
}

/// Open an adapter and run the handshake on it
pub fn open_session(
    device: &str,
    config: SessionConfig,
) -> Result<DeviceSession<BoxedTransport>, Box<dyn std::error::Error>> {
    let transport = open_transport(device)?;
    Ok(DeviceSession::open_with_config(transport, config)?)
}

/// Open an adapter and wrap the session in an I2C bus
pub fn open_bus(
    device: &str,
    config: SessionConfig,
) -> Result<I2cBus<BoxedTransport>, Box<dyn std::error::Error>> {
    Ok(I2cBus::new(open_session(device, config)?))
}
