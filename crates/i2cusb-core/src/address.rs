//! 7-bit I2C addresses

use core::fmt;
use core::str::FromStr;

use crate::error::{InvalidAddress, ParseAddressError};

/// A 7-bit I2C peripheral address (0x00-0x7F)
///
/// The address travels in `wIndex` of every I2C_IO request; the bridge
/// shifts it left and appends the R/W bit itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// Highest valid 7-bit address
    pub const MAX: u8 = 0x7F;

    /// Create an address, rejecting values that do not fit in 7 bits
    pub const fn new(addr: u8) -> Result<Self, InvalidAddress> {
        if addr > Self::MAX {
            Err(InvalidAddress(addr as u16))
        } else {
            Ok(Self(addr))
        }
    }

    /// The raw 7-bit value
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Value placed in the `wIndex` field of a request
    pub const fn index(self) -> u16 {
        self.0 as u16
    }

    /// Whether the address falls in one of the ranges the I2C specification
    /// reserves (general call, CBUS, HS-mode master codes, 10-bit prefix)
    pub const fn is_reserved(self) -> bool {
        self.0 < 0x08 || self.0 > 0x77
    }
}

impl TryFrom<u8> for I2cAddress {
    type Error = InvalidAddress;

    fn try_from(addr: u8) -> Result<Self, Self::Error> {
        Self::new(addr)
    }
}

impl TryFrom<u16> for I2cAddress {
    type Error = InvalidAddress;

    fn try_from(addr: u16) -> Result<Self, Self::Error> {
        match u8::try_from(addr) {
            Ok(a) => Self::new(a),
            Err(_) => Err(InvalidAddress(addr)),
        }
    }
}

impl From<I2cAddress> for u8 {
    fn from(addr: I2cAddress) -> Self {
        addr.0
    }
}

impl FromStr for I2cAddress {
    type Err = ParseAddressError;

    /// Parse a hex (`0x50`) or decimal (`80`) address
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u16::from_str_radix(hex, 16)
        } else {
            s.parse::<u16>()
        };
        let value = parsed.map_err(|_| ParseAddressError::Syntax(s.to_string()))?;
        Ok(Self::try_from(value)?)
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_range() {
        assert_eq!(I2cAddress::new(0x50).unwrap().get(), 0x50);
        assert_eq!(I2cAddress::new(0x7F).unwrap().get(), 0x7F);
        assert_eq!(I2cAddress::new(0x80), Err(InvalidAddress(0x80)));
        assert_eq!(I2cAddress::try_from(0x150u16), Err(InvalidAddress(0x150)));
    }

    #[test]
    fn test_address_parse() {
        assert_eq!("0x50".parse::<I2cAddress>().unwrap().get(), 0x50);
        assert_eq!("0X18".parse::<I2cAddress>().unwrap().get(), 0x18);
        assert_eq!("81".parse::<I2cAddress>().unwrap().get(), 81);
        assert_eq!(
            "0x80".parse::<I2cAddress>(),
            Err(ParseAddressError::OutOfRange(InvalidAddress(0x80)))
        );
        assert_eq!(
            "eeprom".parse::<I2cAddress>(),
            Err(ParseAddressError::Syntax("eeprom".to_string()))
        );
        assert_eq!(
            "eeprom".parse::<I2cAddress>().unwrap_err().to_string(),
            "invalid I2C address \"eeprom\": expected hex (0x50) or decimal (80)"
        );
    }

    #[test]
    fn test_reserved_ranges() {
        assert!(I2cAddress::new(0x00).unwrap().is_reserved());
        assert!(I2cAddress::new(0x07).unwrap().is_reserved());
        assert!(!I2cAddress::new(0x08).unwrap().is_reserved());
        assert!(!I2cAddress::new(0x77).unwrap().is_reserved());
        assert!(I2cAddress::new(0x78).unwrap().is_reserved());
    }

    #[test]
    fn test_display() {
        assert_eq!(I2cAddress::new(0x0A).unwrap().to_string(), "0x0A");
        assert_eq!(I2cAddress::new(0x50).unwrap().index(), 0x0050);
    }
}
