//! MESSAGE-INTEGRITY attribute
//!
//! HMAC-SHA1 over the message up to (not including) the attribute itself,
//! computed while the header length already accounts for the 24 bytes the
//! attribute will occupy (RFC 5389 Section 15.4).

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::attribute_type::AttributeType;
use crate::errors::{Result, StunError};
use crate::message::Message;
use crate::message_header::{ATTRIBUTE_HEADER_SIZE, LENGTH_RANGE};

type HmacSha1 = Hmac<Sha1>;

/// Size of the HMAC-SHA1 output carried by the attribute.
pub const MESSAGE_INTEGRITY_SIZE: usize = 20;

const CREDENTIALS_SEPARATOR: &str = ":";

/// HMAC key used to sign or verify MESSAGE-INTEGRITY.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct MessageIntegrity(pub Vec<u8>);

impl std::fmt::Debug for MessageIntegrity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MessageIntegrity(<key>)")
    }
}

impl MessageIntegrity {
    /// Long-term credentials: key = MD5(username ":" realm ":" password).
    pub fn new_long_term(username: &str, realm: &str, password: &str) -> Self {
        let credentials = [username, realm, password].join(CREDENTIALS_SEPARATOR);
        let digest = md5::compute(credentials.as_bytes());
        MessageIntegrity(digest.0.to_vec())
    }

    /// Short-term credentials: key = password bytes.
    pub fn new_short_term(password: &str) -> Self {
        MessageIntegrity(password.as_bytes().to_vec())
    }

    /// Signs everything currently in `m` and appends the attribute.
    ///
    /// # Returns
    /// * `Err(StunError::FingerprintBeforeIntegrity)` - `m` already carries FINGERPRINT
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        if m.contains(AttributeType::FINGERPRINT) {
            return Err(StunError::FingerprintBeforeIntegrity);
        }

        let mac = m.with_pretended_length(
            ATTRIBUTE_HEADER_SIZE + MESSAGE_INTEGRITY_SIZE,
            |raw| -> Result<Vec<u8>> {
                let mut mac = self.keyed()?;
                mac.update(raw);
                Ok(mac.finalize().into_bytes().to_vec())
            },
        )?;

        m.add(AttributeType::MESSAGE_INTEGRITY, &mac)
    }

    /// Verifies the MESSAGE-INTEGRITY attribute of `m`.
    ///
    /// Attributes appended after MESSAGE-INTEGRITY (typically FINGERPRINT)
    /// are excluded from the recomputed length.
    ///
    /// # Returns
    /// * `Err(StunError::AttributeNotFound)` - no MESSAGE-INTEGRITY in `m`
    /// * `Err(StunError::IntegrityMismatch)` - HMAC differs
    pub fn check(&self, m: &Message) -> Result<()> {
        let (offset, after) = m
            .attribute_offset(AttributeType::MESSAGE_INTEGRITY)
            .ok_or(StunError::AttributeNotFound(AttributeType::MESSAGE_INTEGRITY))?;
        let expected = m.get(AttributeType::MESSAGE_INTEGRITY)?;

        let trailing: usize = after.iter().map(|a| a.wire_len()).sum();
        let length = (m.length - trailing) as u16;

        let mut mac = self.keyed()?;
        mac.update(&m.raw[..LENGTH_RANGE.start]);
        mac.update(&length.to_be_bytes());
        mac.update(&m.raw[LENGTH_RANGE.end..offset]);

        mac.verify_slice(expected)
            .map_err(|_| StunError::IntegrityMismatch)
    }

    fn keyed(&self) -> Result<HmacSha1> {
        HmacSha1::new_from_slice(&self.0)
            .map_err(|e| StunError::Crypto(format!("HMAC init failed: {}", e)))
    }
}
