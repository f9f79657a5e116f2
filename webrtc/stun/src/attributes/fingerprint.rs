//! FINGERPRINT attribute
//!
//! CRC-32 (IEEE) of the message preceding the attribute, XORed with
//! 0x5354554E. Lets a receiver tell STUN apart from other protocols
//! multiplexed on the same port.

use crc::{CRC_32_ISO_HDLC, Crc};

use crate::attribute_type::AttributeType;
use crate::errors::{Result, StunError};
use crate::message::Message;
use crate::message_header::{ATTRIBUTE_HEADER_SIZE, HEADER_SIZE, LENGTH_RANGE, read_u32};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// XOR mask applied to the CRC ("STUN" in ASCII).
pub const FINGERPRINT_XOR_VALUE: u32 = 0x5354_554E;

/// Size of the attribute value.
pub const FINGERPRINT_SIZE: usize = 4;

/// Unit setter for FINGERPRINT. Must be the last attribute added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fingerprint;

/// Computes the fingerprint of `bytes`.
pub fn fingerprint_value(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes) ^ FINGERPRINT_XOR_VALUE
}

impl Fingerprint {
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        let value = m.with_pretended_length(ATTRIBUTE_HEADER_SIZE + FINGERPRINT_SIZE, |raw| {
            fingerprint_value(raw)
        });
        m.add(AttributeType::FINGERPRINT, &value.to_be_bytes())
    }

    /// Recomputes the CRC over the bytes preceding FINGERPRINT and compares.
    ///
    /// # Returns
    /// * `Err(StunError::AttributeNotFound)` - no FINGERPRINT in `m`
    /// * `Err(StunError::AttributeSizeMismatch)` - value is not 4 bytes
    /// * `Err(StunError::FingerprintMismatch)` - CRC differs
    pub fn check(m: &Message) -> Result<()> {
        let (offset, _) = m
            .attribute_offset(AttributeType::FINGERPRINT)
            .ok_or(StunError::AttributeNotFound(AttributeType::FINGERPRINT))?;
        let value = m.get(AttributeType::FINGERPRINT)?;
        if value.len() != FINGERPRINT_SIZE {
            return Err(StunError::AttributeSizeMismatch {
                attr: AttributeType::FINGERPRINT,
                got: value.len(),
                expected: FINGERPRINT_SIZE,
            });
        }
        let actual = read_u32(value);

        let length = (offset + ATTRIBUTE_HEADER_SIZE + FINGERPRINT_SIZE - HEADER_SIZE) as u16;
        let mut digest = CRC32.digest();
        digest.update(&m.raw[..LENGTH_RANGE.start]);
        digest.update(&length.to_be_bytes());
        digest.update(&m.raw[LENGTH_RANGE.end..offset]);
        let expected = digest.finalize() ^ FINGERPRINT_XOR_VALUE;

        if expected != actual {
            return Err(StunError::FingerprintMismatch { expected, actual });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_type::MessageType;
    use crate::transaction_id::TransactionId;

    #[test]
    fn test_fingerprint_value_of_empty_input() {
        // CRC-32 of nothing is 0
        assert_eq!(fingerprint_value(&[]), FINGERPRINT_XOR_VALUE);
    }

    #[test]
    fn test_add_then_check() {
        let mut m = Message::new(MessageType::BINDING_REQUEST, TransactionId([9; 12]));
        m.add(AttributeType::SOFTWARE, b"roomrtc").unwrap();
        Fingerprint.add_to(&mut m).unwrap();

        assert_eq!(m.length, 12 + 8);
        Fingerprint::check(&m).unwrap();

        let decoded = Message::decode(&m.encode()).unwrap();
        Fingerprint::check(&decoded).unwrap();
    }

    #[test]
    fn test_value_covers_pretended_length() {
        let mut m = Message::new(MessageType::BINDING_REQUEST, TransactionId([0; 12]));
        Fingerprint.add_to(&mut m).unwrap();

        // the header already carries the final length, as it did while hashing
        assert_eq!(&m.raw[2..4], &[0, 8]);
        let expected = fingerprint_value(&m.raw[..20]);
        assert_eq!(m.get(AttributeType::FINGERPRINT).unwrap(), &expected.to_be_bytes());
    }

    #[test]
    fn test_check_detects_corruption() {
        let mut m = Message::new(MessageType::BINDING_REQUEST, TransactionId([9; 12]));
        m.add(AttributeType::SOFTWARE, b"roomrtc").unwrap();
        Fingerprint.add_to(&mut m).unwrap();

        let mut bytes = m.encode();
        bytes[25] ^= 0xFF;
        let decoded = Message::decode(&bytes).unwrap();
        assert!(matches!(
            Fingerprint::check(&decoded),
            Err(StunError::FingerprintMismatch { .. })
        ));
    }

    #[test]
    fn test_check_wrong_size() {
        let mut m = Message::new(MessageType::BINDING_REQUEST, TransactionId([9; 12]));
        m.add(AttributeType::FINGERPRINT, &[1, 2]).unwrap();
        assert_eq!(
            Fingerprint::check(&m),
            Err(StunError::AttributeSizeMismatch {
                attr: AttributeType::FINGERPRINT,
                got: 2,
                expected: 4,
            })
        );
    }

    #[test]
    fn test_check_missing() {
        let m = Message::new(MessageType::BINDING_REQUEST, TransactionId([9; 12]));
        assert_eq!(
            Fingerprint::check(&m),
            Err(StunError::AttributeNotFound(AttributeType::FINGERPRINT))
        );
    }
}
