//! STUN message types
//!
//! This module defines the message types used in STUN protocol according to RFC 5389.
//! A message type is a (method, class) pair packed into the 14 low bits of the
//! first header word:
//!
//! ```text
//!  0                 1
//!  2  3  4 5 6 7 8 9 0 1 2 3 4 5
//! +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
//! |M |M |M|M|M|C|M|M|M|C|M|M|M|M|
//! |11|10|9|8|7|1|6|5|4|0|3|2|1|0|
//! +--+--+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::fmt;

const METHOD_A_BITS: u16 = 0x000F; // M0-M3
const METHOD_B_BITS: u16 = 0x0070; // M4-M6
const METHOD_D_BITS: u16 = 0x0F80; // M7-M11
const METHOD_B_SHIFT: u16 = 1;
const METHOD_D_SHIFT: u16 = 2;

const CLASS_C0_BIT: u16 = 0x1;
const CLASS_C1_BIT: u16 = 0x2;
const CLASS_C0_SHIFT: u16 = 4;
const CLASS_C1_SHIFT: u16 = 7;

/// STUN method (12 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Method(pub u16);

impl Method {
    pub const BINDING: Method = Method(0x001);
    pub const ALLOCATE: Method = Method(0x003);
    pub const REFRESH: Method = Method(0x004);
    pub const SEND: Method = Method(0x006);
    pub const DATA: Method = Method(0x007);
    pub const CREATE_PERMISSION: Method = Method(0x008);
    pub const CHANNEL_BIND: Method = Method(0x009);
    pub const CONNECT: Method = Method(0x00A);
    pub const CONNECTION_BIND: Method = Method(0x00B);
    pub const CONNECTION_ATTEMPT: Method = Method(0x00C);

    fn name(self) -> Option<&'static str> {
        let name = match self {
            Method::BINDING => "Binding",
            Method::ALLOCATE => "Allocate",
            Method::REFRESH => "Refresh",
            Method::SEND => "Send",
            Method::DATA => "Data",
            Method::CREATE_PERMISSION => "CreatePermission",
            Method::CHANNEL_BIND => "ChannelBind",
            Method::CONNECT => "Connect",
            Method::CONNECTION_BIND => "ConnectionBind",
            Method::CONNECTION_ATTEMPT => "ConnectionAttempt",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:X}", self.0),
        }
    }
}

/// STUN message class (2 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageClass {
    #[default]
    Request,
    Indication,
    SuccessResponse,
    ErrorResponse,
}

impl MessageClass {
    fn bits(self) -> u16 {
        match self {
            MessageClass::Request => 0b00,
            MessageClass::Indication => 0b01,
            MessageClass::SuccessResponse => 0b10,
            MessageClass::ErrorResponse => 0b11,
        }
    }

    fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => MessageClass::Request,
            0b01 => MessageClass::Indication,
            0b10 => MessageClass::SuccessResponse,
            _ => MessageClass::ErrorResponse,
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageClass::Request => "request",
            MessageClass::Indication => "indication",
            MessageClass::SuccessResponse => "success response",
            MessageClass::ErrorResponse => "error response",
        };
        f.write_str(s)
    }
}

/// STUN message type: a method and a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageType {
    pub method: Method,
    pub class: MessageClass,
}

impl MessageType {
    /// Binding Request (0x0001)
    pub const BINDING_REQUEST: MessageType = MessageType::new(Method::BINDING, MessageClass::Request);
    /// Binding Success Response (0x0101)
    pub const BINDING_SUCCESS: MessageType =
        MessageType::new(Method::BINDING, MessageClass::SuccessResponse);
    /// Binding Error Response (0x0111)
    pub const BINDING_ERROR: MessageType =
        MessageType::new(Method::BINDING, MessageClass::ErrorResponse);

    pub const fn new(method: Method, class: MessageClass) -> Self {
        Self { method, class }
    }

    /// Packs method and class into the 16-bit wire value.
    pub fn to_u16(self) -> u16 {
        let m = self.method.0;
        let method = (m & METHOD_A_BITS)
            | ((m & METHOD_B_BITS) << METHOD_B_SHIFT)
            | ((m & METHOD_D_BITS) << METHOD_D_SHIFT);

        let c = self.class.bits();
        let class = ((c & CLASS_C0_BIT) << CLASS_C0_SHIFT) | ((c & CLASS_C1_BIT) << CLASS_C1_SHIFT);

        method | class
    }

    /// Unpacks method and class from the 16-bit wire value.
    ///
    /// The two most significant bits are ignored; every other value maps to
    /// some (method, class) pair.
    pub fn from_u16(value: u16) -> Self {
        let c0 = (value >> CLASS_C0_SHIFT) & CLASS_C0_BIT;
        let c1 = (value >> CLASS_C1_SHIFT) & CLASS_C1_BIT;
        let class = MessageClass::from_bits(c0 | c1);

        let a = value & METHOD_A_BITS;
        let b = (value >> METHOD_B_SHIFT) & METHOD_B_BITS;
        let d = (value >> METHOD_D_SHIFT) & METHOD_D_BITS;

        Self {
            method: Method(a | b | d),
            class,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_to_u16() {
        assert_eq!(MessageType::BINDING_REQUEST.to_u16(), 0x0001);
        assert_eq!(MessageType::BINDING_SUCCESS.to_u16(), 0x0101);
        assert_eq!(MessageType::BINDING_ERROR.to_u16(), 0x0111);
        assert_eq!(
            MessageType::new(Method::BINDING, MessageClass::Indication).to_u16(),
            0x0011
        );
        assert_eq!(
            MessageType::new(Method::ALLOCATE, MessageClass::Request).to_u16(),
            0x0003
        );
        assert_eq!(
            MessageType::new(Method::CREATE_PERMISSION, MessageClass::ErrorResponse).to_u16(),
            0x0118
        );
    }

    #[test]
    fn test_message_type_from_u16() {
        assert_eq!(MessageType::from_u16(0x0001), MessageType::BINDING_REQUEST);
        assert_eq!(MessageType::from_u16(0x0101), MessageType::BINDING_SUCCESS);
        assert_eq!(MessageType::from_u16(0x0111), MessageType::BINDING_ERROR);
        assert_eq!(
            MessageType::from_u16(0x0104),
            MessageType::new(Method::REFRESH, MessageClass::SuccessResponse)
        );
    }

    #[test]
    fn test_method_bits_survive_packing() {
        // Highest method bits sit above both class bits.
        let t = MessageType::new(Method(0xFFF), MessageClass::Request);
        assert_eq!(t.to_u16(), 0x3EEF);
        assert_eq!(MessageType::from_u16(0x3EEF), t);

        let t = MessageType::new(Method(0xFFF), MessageClass::ErrorResponse);
        assert_eq!(t.to_u16(), 0x3FFF);
        assert_eq!(MessageType::from_u16(0x3FFF), t);
    }

    #[test]
    fn test_message_type_display() {
        assert_eq!(MessageType::BINDING_SUCCESS.to_string(), "Binding success response");
        assert_eq!(
            MessageType::new(Method(0x0FF), MessageClass::Indication).to_string(),
            "0xFF indication"
        );
    }
}
