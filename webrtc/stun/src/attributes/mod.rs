//! Typed STUN attributes
//!
//! Each attribute kind knows how to append itself to a [`Message`]
//! (`add_to`) and, where it carries a value, how to read itself back
//! (`get_from`). [`Attribute`] closes the set of setters so that
//! [`Message::build`] can apply a heterogeneous list in order.

pub mod address;
pub mod error_code;
pub mod fingerprint;
pub mod ice;
pub mod integrity;
pub mod text;
pub mod unknown_attributes;
pub mod xor_mapped_address;

pub use address::MappedAddress;
pub use error_code::{ErrorCode, ErrorCodeAttribute};
pub use fingerprint::{Fingerprint, fingerprint_value};
pub use ice::{IceControlled, IceControlling, Priority, UseCandidate};
pub use integrity::MessageIntegrity;
pub use text::TextAttribute;
pub use unknown_attributes::UnknownAttributes;
pub use xor_mapped_address::XorMappedAddress;

use crate::attribute_type::AttributeType;
use crate::errors::Result;
use crate::message::{Message, RawAttribute};

/// Any attribute that can be added to a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    MappedAddress(MappedAddress),
    AlternateServer(MappedAddress),
    XorMappedAddress(XorMappedAddress),
    XorPeerAddress(XorMappedAddress),
    XorRelayedAddress(XorMappedAddress),
    MessageIntegrity(MessageIntegrity),
    Fingerprint,
    ErrorCode(ErrorCodeAttribute),
    Text(TextAttribute),
    UnknownAttributes(UnknownAttributes),
    Priority(Priority),
    UseCandidate,
    IceControlled(IceControlled),
    IceControlling(IceControlling),
    /// Encoded from `value`; the declared `length` is recomputed from it.
    Raw(RawAttribute),
}

impl Attribute {
    /// Appends the attribute to `m`.
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        match self {
            Attribute::MappedAddress(addr) => addr.add_to(m),
            Attribute::AlternateServer(addr) => addr.add_to_as(m, AttributeType::ALTERNATE_SERVER),
            Attribute::XorMappedAddress(addr) => addr.add_to(m),
            Attribute::XorPeerAddress(addr) => addr.add_to_as(m, AttributeType::XOR_PEER_ADDRESS),
            Attribute::XorRelayedAddress(addr) => {
                addr.add_to_as(m, AttributeType::XOR_RELAYED_ADDRESS)
            }
            Attribute::MessageIntegrity(integrity) => integrity.add_to(m),
            Attribute::Fingerprint => Fingerprint.add_to(m),
            Attribute::ErrorCode(code) => code.add_to(m),
            Attribute::Text(text) => text.add_to(m),
            Attribute::UnknownAttributes(unknown) => unknown.add_to(m),
            Attribute::Priority(priority) => priority.add_to(m),
            Attribute::UseCandidate => UseCandidate.add_to(m),
            Attribute::IceControlled(tie_breaker) => tie_breaker.add_to(m),
            Attribute::IceControlling(tie_breaker) => tie_breaker.add_to(m),
            Attribute::Raw(raw) => m.add(raw.typ, &raw.value),
        }
    }

    /// Wire type the attribute is encoded under.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Attribute::MappedAddress(_) => AttributeType::MAPPED_ADDRESS,
            Attribute::AlternateServer(_) => AttributeType::ALTERNATE_SERVER,
            Attribute::XorMappedAddress(_) => AttributeType::XOR_MAPPED_ADDRESS,
            Attribute::XorPeerAddress(_) => AttributeType::XOR_PEER_ADDRESS,
            Attribute::XorRelayedAddress(_) => AttributeType::XOR_RELAYED_ADDRESS,
            Attribute::MessageIntegrity(_) => AttributeType::MESSAGE_INTEGRITY,
            Attribute::Fingerprint => AttributeType::FINGERPRINT,
            Attribute::ErrorCode(_) => AttributeType::ERROR_CODE,
            Attribute::Text(text) => text.attr,
            Attribute::UnknownAttributes(_) => AttributeType::UNKNOWN_ATTRIBUTES,
            Attribute::Priority(_) => AttributeType::PRIORITY,
            Attribute::UseCandidate => AttributeType::USE_CANDIDATE,
            Attribute::IceControlled(_) => AttributeType::ICE_CONTROLLED,
            Attribute::IceControlling(_) => AttributeType::ICE_CONTROLLING,
            Attribute::Raw(raw) => raw.typ,
        }
    }
}
