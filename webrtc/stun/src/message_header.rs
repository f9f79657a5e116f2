//! STUN message header
//!
//! This module holds the constants and field accessors for the fixed 20-byte
//! header that precedes all STUN message bodies.
//!
//! # Header Format (RFC 5389 Section 6)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |0 0|     STUN Message Type     |         Message Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Magic Cookie                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! |                     Transaction ID (96 bits)                  |
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use crate::errors::{Result, StunError};
use crate::message_type::MessageType;
use crate::transaction_id::{TRANSACTION_ID_SIZE, TransactionId};

/// Magic cookie value defined in RFC 5389.
/// This value is used to identify STUN messages and for XOR operations.
pub const MAGIC_COOKIE: u32 = 0x2112A442;

/// Size of the STUN message header in bytes.
pub const HEADER_SIZE: usize = 20;

/// Size of an attribute's type + length prefix in bytes.
pub const ATTRIBUTE_HEADER_SIZE: usize = 4;

pub(crate) const TYPE_RANGE: std::ops::Range<usize> = 0..2;
pub(crate) const LENGTH_RANGE: std::ops::Range<usize> = 2..4;
pub(crate) const COOKIE_RANGE: std::ops::Range<usize> = 4..8;
pub(crate) const TRANSACTION_ID_RANGE: std::ops::Range<usize> = 8..HEADER_SIZE;

/// Fields read from a raw header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MessageHeader {
    pub message_type: MessageType,
    pub length: usize,
    pub transaction_id: TransactionId,
}

impl MessageHeader {
    /// Parses the first 20 bytes of `bytes`.
    ///
    /// # Returns
    /// * `Err(StunError::UnexpectedHeaderEof)` - fewer than 20 bytes
    /// * `Err(StunError::InvalidMagicCookie)` - cookie field is not `MAGIC_COOKIE`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(StunError::UnexpectedHeaderEof);
        }

        let cookie = read_u32(&bytes[COOKIE_RANGE]);
        if cookie != MAGIC_COOKIE {
            return Err(StunError::InvalidMagicCookie(cookie));
        }

        let mut transaction_id = [0u8; TRANSACTION_ID_SIZE];
        transaction_id.copy_from_slice(&bytes[TRANSACTION_ID_RANGE]);

        Ok(Self {
            message_type: MessageType::from_u16(read_u16(&bytes[TYPE_RANGE])),
            length: read_u16(&bytes[LENGTH_RANGE]) as usize,
            transaction_id: TransactionId(transaction_id),
        })
    }

    /// Writes all header fields into the first 20 bytes of `buf`.
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[TYPE_RANGE].copy_from_slice(&self.message_type.to_u16().to_be_bytes());
        buf[LENGTH_RANGE].copy_from_slice(&(self.length as u16).to_be_bytes());
        buf[COOKIE_RANGE].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        buf[TRANSACTION_ID_RANGE].copy_from_slice(&self.transaction_id.0);
    }
}

/// Cheap framing check: `bytes` is long enough for a header and carries the
/// magic cookie. Useful for demultiplexing STUN from media on a shared port.
pub fn is_message(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_SIZE && read_u32(&bytes[COOKIE_RANGE]) == MAGIC_COOKIE
}

/// Rounds a value length up to the next multiple of 4.
pub(crate) fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub(crate) fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

pub(crate) fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
