//! STUN attribute types
//!
//! This module defines the attribute types used in STUN messages according to RFC 5389,
//! plus the ICE (RFC 8445) and TURN (RFC 5766, RFC 6062, RFC 6156) extensions.
//! Attributes provide additional information in STUN messages using Type-Length-Value (TLV) format.
//!
//! Types in 0x0000-0x7FFF are comprehension-required: an agent that does not
//! understand one must reject the message. Types in 0x8000-0xFFFF are
//! comprehension-optional and may be ignored.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// A STUN attribute type code.
///
/// Any 16-bit value is representable so that unknown attributes survive a
/// decode/encode cycle; well-known codes are associated constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AttributeType(pub u16);

impl AttributeType {
    /// MAPPED-ADDRESS (0x0001) - reflexive transport address (legacy, not XOR'd)
    pub const MAPPED_ADDRESS: AttributeType = AttributeType(0x0001);
    /// USERNAME (0x0006)
    pub const USERNAME: AttributeType = AttributeType(0x0006);
    /// MESSAGE-INTEGRITY (0x0008) - HMAC-SHA1 over the preceding message bytes
    pub const MESSAGE_INTEGRITY: AttributeType = AttributeType(0x0008);
    /// ERROR-CODE (0x0009)
    pub const ERROR_CODE: AttributeType = AttributeType(0x0009);
    /// UNKNOWN-ATTRIBUTES (0x000A)
    pub const UNKNOWN_ATTRIBUTES: AttributeType = AttributeType(0x000A);
    /// REALM (0x0014)
    pub const REALM: AttributeType = AttributeType(0x0014);
    /// NONCE (0x0015)
    pub const NONCE: AttributeType = AttributeType(0x0015);
    /// XOR-MAPPED-ADDRESS (0x0020) - XOR'd reflexive transport address (recommended)
    pub const XOR_MAPPED_ADDRESS: AttributeType = AttributeType(0x0020);

    /// SOFTWARE (0x8022)
    pub const SOFTWARE: AttributeType = AttributeType(0x8022);
    /// ALTERNATE-SERVER (0x8023)
    pub const ALTERNATE_SERVER: AttributeType = AttributeType(0x8023);
    /// FINGERPRINT (0x8028) - CRC-32 of the preceding message bytes
    pub const FINGERPRINT: AttributeType = AttributeType(0x8028);

    /// PRIORITY (0x0024)
    pub const PRIORITY: AttributeType = AttributeType(0x0024);
    /// USE-CANDIDATE (0x0025)
    pub const USE_CANDIDATE: AttributeType = AttributeType(0x0025);
    /// ICE-CONTROLLED (0x8029)
    pub const ICE_CONTROLLED: AttributeType = AttributeType(0x8029);
    /// ICE-CONTROLLING (0x802A)
    pub const ICE_CONTROLLING: AttributeType = AttributeType(0x802A);

    /// CHANNEL-NUMBER (0x000C)
    pub const CHANNEL_NUMBER: AttributeType = AttributeType(0x000C);
    /// LIFETIME (0x000D)
    pub const LIFETIME: AttributeType = AttributeType(0x000D);
    /// XOR-PEER-ADDRESS (0x0012)
    pub const XOR_PEER_ADDRESS: AttributeType = AttributeType(0x0012);
    /// DATA (0x0013)
    pub const DATA: AttributeType = AttributeType(0x0013);
    /// XOR-RELAYED-ADDRESS (0x0016)
    pub const XOR_RELAYED_ADDRESS: AttributeType = AttributeType(0x0016);
    /// REQUESTED-ADDRESS-FAMILY (0x0017)
    pub const REQUESTED_ADDRESS_FAMILY: AttributeType = AttributeType(0x0017);
    /// EVEN-PORT (0x0018)
    pub const EVEN_PORT: AttributeType = AttributeType(0x0018);
    /// REQUESTED-TRANSPORT (0x0019)
    pub const REQUESTED_TRANSPORT: AttributeType = AttributeType(0x0019);
    /// DONT-FRAGMENT (0x001A)
    pub const DONT_FRAGMENT: AttributeType = AttributeType(0x001A);
    /// RESERVATION-TOKEN (0x0022)
    pub const RESERVATION_TOKEN: AttributeType = AttributeType(0x0022);
    /// CONNECTION-ID (0x002A)
    pub const CONNECTION_ID: AttributeType = AttributeType(0x002A);

    /// Pre-RFC 5389 code some servers still send for XOR-MAPPED-ADDRESS.
    pub(crate) const LEGACY_XOR_MAPPED_ADDRESS: AttributeType = AttributeType(0x8020);

    /// Converts the attribute type to its wire value.
    pub fn to_u16(self) -> u16 {
        self.0
    }

    /// Whether the type lies in the comprehension-required range.
    pub fn required(self) -> bool {
        self.0 <= 0x7FFF
    }

    /// Whether the type lies in the comprehension-optional range.
    pub fn optional(self) -> bool {
        self.0 >= 0x8000
    }

    /// Registered name of the attribute, if known.
    pub fn name(self) -> Option<&'static str> {
        ATTRIBUTE_NAMES.get(&self.0).copied()
    }

    /// Maps legacy codes to their RFC 5389 equivalent.
    pub(crate) fn compat(value: u16) -> Self {
        if value == Self::LEGACY_XOR_MAPPED_ADDRESS.0 {
            Self::XOR_MAPPED_ADDRESS
        } else {
            AttributeType(value)
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:04X}", self.0),
        }
    }
}

impl From<u16> for AttributeType {
    fn from(value: u16) -> Self {
        AttributeType(value)
    }
}

static ATTRIBUTE_NAMES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (AttributeType::MAPPED_ADDRESS.0, "MAPPED-ADDRESS"),
        (AttributeType::USERNAME.0, "USERNAME"),
        (AttributeType::MESSAGE_INTEGRITY.0, "MESSAGE-INTEGRITY"),
        (AttributeType::ERROR_CODE.0, "ERROR-CODE"),
        (AttributeType::UNKNOWN_ATTRIBUTES.0, "UNKNOWN-ATTRIBUTES"),
        (AttributeType::REALM.0, "REALM"),
        (AttributeType::NONCE.0, "NONCE"),
        (AttributeType::XOR_MAPPED_ADDRESS.0, "XOR-MAPPED-ADDRESS"),
        (AttributeType::SOFTWARE.0, "SOFTWARE"),
        (AttributeType::ALTERNATE_SERVER.0, "ALTERNATE-SERVER"),
        (AttributeType::FINGERPRINT.0, "FINGERPRINT"),
        (AttributeType::PRIORITY.0, "PRIORITY"),
        (AttributeType::USE_CANDIDATE.0, "USE-CANDIDATE"),
        (AttributeType::ICE_CONTROLLED.0, "ICE-CONTROLLED"),
        (AttributeType::ICE_CONTROLLING.0, "ICE-CONTROLLING"),
        (AttributeType::CHANNEL_NUMBER.0, "CHANNEL-NUMBER"),
        (AttributeType::LIFETIME.0, "LIFETIME"),
        (AttributeType::XOR_PEER_ADDRESS.0, "XOR-PEER-ADDRESS"),
        (AttributeType::DATA.0, "DATA"),
        (AttributeType::XOR_RELAYED_ADDRESS.0, "XOR-RELAYED-ADDRESS"),
        (
            AttributeType::REQUESTED_ADDRESS_FAMILY.0,
            "REQUESTED-ADDRESS-FAMILY",
        ),
        (AttributeType::EVEN_PORT.0, "EVEN-PORT"),
        (AttributeType::REQUESTED_TRANSPORT.0, "REQUESTED-TRANSPORT"),
        (AttributeType::DONT_FRAGMENT.0, "DONT-FRAGMENT"),
        (AttributeType::RESERVATION_TOKEN.0, "RESERVATION-TOKEN"),
        (AttributeType::CONNECTION_ID.0, "CONNECTION-ID"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_type_to_u16() {
        assert_eq!(AttributeType::XOR_MAPPED_ADDRESS.to_u16(), 0x0020);
        assert_eq!(AttributeType::FINGERPRINT.to_u16(), 0x8028);
    }

    #[test]
    fn test_comprehension_ranges() {
        assert!(AttributeType::USERNAME.required());
        assert!(!AttributeType::USERNAME.optional());
        assert!(AttributeType::SOFTWARE.optional());
        assert!(AttributeType(0x7FFF).required());
        assert!(AttributeType(0x8000).optional());
    }

    #[test]
    fn test_display_known_and_unknown() {
        assert_eq!(AttributeType::MESSAGE_INTEGRITY.to_string(), "MESSAGE-INTEGRITY");
        assert_eq!(AttributeType::ICE_CONTROLLING.to_string(), "ICE-CONTROLLING");
        assert_eq!(AttributeType(0x1234).to_string(), "0x1234");
    }

    #[test]
    fn test_legacy_xor_mapped_address_is_remapped() {
        assert_eq!(AttributeType::compat(0x8020), AttributeType::XOR_MAPPED_ADDRESS);
        assert_eq!(AttributeType::compat(0x0001), AttributeType::MAPPED_ADDRESS);
    }
}
