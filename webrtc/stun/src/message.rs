//! STUN message structure
//!
//! This module implements the complete STUN message structure according to RFC 5389.
//! A STUN message consists of a 20-byte header followed by zero or more attributes.
//!
//! [`Message`] keeps two views in sync: the parsed attribute list and the
//! canonical wire bytes in `raw`. Every [`Message::add`] appends the TLV to
//! `raw` and rewrites the header length immediately, so transforms that hash
//! the message "as of now" (MESSAGE-INTEGRITY, FINGERPRINT) always see a
//! self-consistent buffer.

use std::fmt;

use crate::attribute_type::AttributeType;
use crate::attributes::Attribute;
use crate::errors::{Result, StunError};
use crate::message_header::{
    ATTRIBUTE_HEADER_SIZE, HEADER_SIZE, LENGTH_RANGE, MessageHeader, padded_len, read_u16,
};
use crate::message_type::MessageType;
use crate::transaction_id::TransactionId;

/// Largest value the 16-bit header length field can carry.
const MAX_MESSAGE_LENGTH: usize = u16::MAX as usize;

/// A single attribute as it appears on the wire, before typed interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAttribute {
    pub typ: AttributeType,
    /// Logical (unpadded) length of `value`.
    pub length: u16,
    pub value: Vec<u8>,
}

impl RawAttribute {
    /// Size this attribute occupies in the message, header and padding included.
    pub fn wire_len(&self) -> usize {
        ATTRIBUTE_HEADER_SIZE + padded_len(self.length as usize)
    }
}

/// A complete STUN message according to RFC 5389.
#[derive(Debug, Clone)]
pub struct Message {
    pub typ: MessageType,
    /// Number of attribute bytes following the header, padding included.
    pub length: usize,
    pub transaction_id: TransactionId,
    /// Attributes in wire order. Duplicates are allowed; lookups return the first.
    pub attributes: Vec<RawAttribute>,
    /// Canonical encoding: header followed by every padded TLV.
    pub raw: Vec<u8>,
}

impl Message {
    /// Creates a message with no attributes and its header already encoded.
    pub fn new(message_type: MessageType, transaction_id: TransactionId) -> Self {
        let mut message = Self {
            typ: message_type,
            length: 0,
            transaction_id,
            attributes: Vec::new(),
            raw: vec![0u8; HEADER_SIZE],
        };
        message.write_header();
        message
    }

    /// Drops every attribute, keeping type and transaction id.
    pub fn reset(&mut self) {
        self.attributes.clear();
        self.length = 0;
        self.raw.truncate(HEADER_SIZE);
        self.raw.resize(HEADER_SIZE, 0);
        self.write_header();
    }

    /// Resets the message and applies `setters` in order.
    ///
    /// Order matters: MESSAGE-INTEGRITY and FINGERPRINT cover every attribute
    /// set before them.
    pub fn build(&mut self, setters: &[Attribute]) -> Result<()> {
        self.reset();
        for setter in setters {
            setter.add_to(self)?;
        }
        Ok(())
    }

    pub fn set_type(&mut self, message_type: MessageType) {
        self.typ = message_type;
        self.write_header();
    }

    pub fn set_transaction_id(&mut self, transaction_id: TransactionId) {
        self.transaction_id = transaction_id;
        self.write_header();
    }

    /// Gets the message type.
    pub fn message_type(&self) -> MessageType {
        self.typ
    }

    /// Gets the transaction ID.
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// Rewrites all 20 header bytes from the struct fields.
    pub fn write_header(&mut self) {
        MessageHeader {
            message_type: self.typ,
            length: self.length,
            transaction_id: self.transaction_id,
        }
        .encode_into(&mut self.raw[..HEADER_SIZE]);
    }

    /// Rewrites only the header length field.
    pub fn write_length(&mut self) {
        self.raw[LENGTH_RANGE].copy_from_slice(&(self.length as u16).to_be_bytes());
    }

    /// Appends an attribute, zero-padding its value to a 4-byte boundary.
    ///
    /// The declared TLV length is the unpadded `value` size; the header length
    /// grows by the padded size.
    ///
    /// # Returns
    /// * `Err(StunError::AttributeSizeOverflow)` - the value or the resulting
    ///   message would not fit the 16-bit length fields
    pub fn add(&mut self, attr_type: AttributeType, value: &[u8]) -> Result<()> {
        let wire_len = ATTRIBUTE_HEADER_SIZE + padded_len(value.len());
        if value.len() > u16::MAX as usize || self.length + wire_len > MAX_MESSAGE_LENGTH {
            return Err(StunError::AttributeSizeOverflow {
                attr: attr_type,
                got: value.len(),
                max: MAX_MESSAGE_LENGTH.saturating_sub(self.length + ATTRIBUTE_HEADER_SIZE),
            });
        }

        self.raw.reserve(wire_len);
        self.raw.extend_from_slice(&attr_type.to_u16().to_be_bytes());
        self.raw.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.raw.extend_from_slice(value);
        self.raw.resize(self.raw.len() + (wire_len - ATTRIBUTE_HEADER_SIZE - value.len()), 0);

        self.attributes.push(RawAttribute {
            typ: attr_type,
            length: value.len() as u16,
            value: value.to_vec(),
        });

        self.length += wire_len;
        self.write_length();
        Ok(())
    }

    /// Value of the first attribute of type `attr_type`.
    pub fn get(&self, attr_type: AttributeType) -> Result<&[u8]> {
        self.get_attribute(attr_type)
            .map(|a| a.value.as_slice())
            .ok_or(StunError::AttributeNotFound(attr_type))
    }

    pub fn get_attribute(&self, attr_type: AttributeType) -> Option<&RawAttribute> {
        self.attributes.iter().find(|a| a.typ == attr_type)
    }

    pub fn contains(&self, attr_type: AttributeType) -> bool {
        self.get_attribute(attr_type).is_some()
    }

    /// Offset in `raw` at which the first attribute of `attr_type` starts,
    /// together with the attributes that follow it.
    pub(crate) fn attribute_offset(
        &self,
        attr_type: AttributeType,
    ) -> Option<(usize, &[RawAttribute])> {
        let mut offset = HEADER_SIZE;
        for (i, attr) in self.attributes.iter().enumerate() {
            if attr.typ == attr_type {
                return Some((offset, &self.attributes[i + 1..]));
            }
            offset += attr.wire_len();
        }
        None
    }

    /// Runs `f` over `raw` while the header length pretends `extra` more
    /// attribute bytes are present, then restores the true length.
    pub(crate) fn with_pretended_length<R>(&mut self, extra: usize, f: impl FnOnce(&[u8]) -> R) -> R {
        let length = self.length;
        self.length += extra;
        self.write_length();
        let result = f(&self.raw);
        self.length = length;
        self.write_length();
        result
    }

    /// Encodes the complete message to bytes.
    pub fn encode(&self) -> Vec<u8> {
        self.raw.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Decodes a message from bytes.
    ///
    /// The buffer must hold exactly one message: the header length field has
    /// to match the bytes that follow the header.
    ///
    /// # Returns
    /// * `Err(StunError::UnexpectedHeaderEof)` - fewer than 20 bytes
    /// * `Err(StunError::InvalidMagicCookie)` - not a STUN message
    /// * `Err(StunError::MessageLengthMismatch)` - header length disagrees with the buffer
    /// * `Err(StunError::UnexpectedEof)` - truncated attribute header
    /// * `Err(StunError::AttributeSizeInvalid)` - attribute value runs past the end
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = MessageHeader::decode(bytes)?;

        let available = bytes.len() - HEADER_SIZE;
        if header.length != available {
            return Err(StunError::MessageLengthMismatch {
                declared: header.length,
                available,
            });
        }

        let mut attributes = Vec::new();
        let mut rest = &bytes[HEADER_SIZE..];
        while !rest.is_empty() {
            if rest.len() < ATTRIBUTE_HEADER_SIZE {
                return Err(StunError::UnexpectedEof);
            }
            let typ = AttributeType::compat(read_u16(&rest[0..2]));
            let length = read_u16(&rest[2..4]);
            rest = &rest[ATTRIBUTE_HEADER_SIZE..];

            let padded = padded_len(length as usize);
            if rest.len() < padded {
                return Err(StunError::AttributeSizeInvalid);
            }

            attributes.push(RawAttribute {
                typ,
                length,
                value: rest[..length as usize].to_vec(),
            });
            rest = &rest[padded..];
        }

        Ok(Self {
            typ: header.message_type,
            length: header.length,
            transaction_id: header.transaction_id,
            attributes,
            raw: bytes.to_vec(),
        })
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::new(MessageType::default(), TransactionId::default())
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.typ == other.typ
            && self.length == other.length
            && self.transaction_id == other.transaction_id
            && self.attributes == other.attributes
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} l={} attrs={} id={}",
            self.typ,
            self.length,
            self.attributes.len(),
            self.transaction_id
        )
    }
}
