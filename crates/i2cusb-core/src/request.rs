//! USB control request descriptors
//!
//! Every command is carried by the setup packet of a control transfer.
//! The first setup byte, `bmRequestType`, packs three fields:
//!
//! | Bits | Field     | Values                                  |
//! |------|-----------|-----------------------------------------|
//! | 7    | direction | 0 = host-to-device, 1 = device-to-host  |
//! | 6-5  | type      | 0 = standard, 1 = class, 2 = vendor     |
//! | 4-0  | recipient | 0 = device, 1 = interface, 2 = endpoint, 3 = other |
//!
//! Type 3 is invalid and recipients 4-31 are reserved; [`decode`] rejects
//! both, so a decoded descriptor always re-encodes to the same byte.

use crate::error::DecodeError;

/// Data-stage direction of a control transfer
///
/// This is the USB dataflow direction only. It is independent of the I2C
/// read/write direction, which travels in `wValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to device
    Out = 0,
    /// Device to host
    In = 1,
}

/// Request type field of `bmRequestType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    Standard = 0,
    Class = 1,
    Vendor = 2,
}

/// Recipient field of `bmRequestType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    Device = 0,
    Interface = 1,
    Endpoint = 2,
    Other = 3,
}

const DIRECTION_SHIFT: u8 = 7;
const TYPE_SHIFT: u8 = 5;
const TYPE_MASK: u8 = 0x03;
const RECIPIENT_MASK: u8 = 0x1F;

/// Logical description of one control request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    pub direction: Direction,
    pub request_type: RequestType,
    pub recipient: Recipient,
    /// `bRequest`, the vendor command code
    pub command: u8,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
}

/// Encoded setup packet fields (everything except `wLength`, which is
/// the length of the data stage)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetupFields {
    /// `bmRequestType`
    pub request_type: u8,
    /// `bRequest`
    pub request: u8,
    /// `wValue`
    pub value: u16,
    /// `wIndex`
    pub index: u16,
}

impl RequestDescriptor {
    /// Vendor request addressed to the device, data flowing to the host
    pub const fn vendor_in(command: u8, value: u16, index: u16) -> Self {
        Self {
            direction: Direction::In,
            request_type: RequestType::Vendor,
            recipient: Recipient::Device,
            command,
            value,
            index,
        }
    }

    /// Vendor request addressed to the device, data flowing to the device
    pub const fn vendor_out(command: u8, value: u16, index: u16) -> Self {
        Self {
            direction: Direction::Out,
            request_type: RequestType::Vendor,
            recipient: Recipient::Device,
            command,
            value,
            index,
        }
    }

    /// Pack direction, type and recipient into `bmRequestType`
    pub const fn request_type_byte(&self) -> u8 {
        ((self.direction as u8) << DIRECTION_SHIFT)
            | ((self.request_type as u8) << TYPE_SHIFT)
            | self.recipient as u8
    }

    /// Encode into setup packet fields
    pub const fn encode(&self) -> SetupFields {
        SetupFields {
            request_type: self.request_type_byte(),
            request: self.command,
            value: self.value,
            index: self.index,
        }
    }
}

/// Encode a descriptor into setup packet fields
pub const fn encode(descriptor: &RequestDescriptor) -> SetupFields {
    descriptor.encode()
}

/// Decode setup packet fields back into a descriptor
pub fn decode(fields: SetupFields) -> Result<RequestDescriptor, DecodeError> {
    let byte = fields.request_type;

    let direction = if byte >> DIRECTION_SHIFT == 0 {
        Direction::Out
    } else {
        Direction::In
    };

    let request_type = match (byte >> TYPE_SHIFT) & TYPE_MASK {
        0 => RequestType::Standard,
        1 => RequestType::Class,
        2 => RequestType::Vendor,
        _ => return Err(DecodeError::InvalidType(byte)),
    };

    let recipient = match byte & RECIPIENT_MASK {
        0 => Recipient::Device,
        1 => Recipient::Interface,
        2 => Recipient::Endpoint,
        3 => Recipient::Other,
        _ => return Err(DecodeError::ReservedRecipient(byte)),
    };

    Ok(RequestDescriptor {
        direction,
        request_type,
        recipient,
        command: fields.request,
        value: fields.value,
        index: fields.index,
    })
}
