//! Text attributes: USERNAME, REALM, NONCE and SOFTWARE.

use std::fmt;

use crate::attribute_type::AttributeType;
use crate::errors::{Result, StunError};
use crate::message::Message;

/// USERNAME must be fewer than 513 bytes (RFC 5389 Section 15.3).
pub const MAX_USERNAME_SIZE: usize = 513;
/// REALM, NONCE and SOFTWARE share the 763 byte limit.
pub const MAX_REALM_SIZE: usize = 763;
pub const MAX_NONCE_SIZE: usize = 763;
pub const MAX_SOFTWARE_SIZE: usize = 763;

/// A UTF-8 string attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextAttribute {
    pub attr: AttributeType,
    pub text: String,
}

impl TextAttribute {
    pub fn new(attr: AttributeType, text: impl Into<String>) -> Self {
        Self {
            attr,
            text: text.into(),
        }
    }

    pub fn username(text: impl Into<String>) -> Self {
        Self::new(AttributeType::USERNAME, text)
    }

    pub fn realm(text: impl Into<String>) -> Self {
        Self::new(AttributeType::REALM, text)
    }

    pub fn nonce(text: impl Into<String>) -> Self {
        Self::new(AttributeType::NONCE, text)
    }

    pub fn software(text: impl Into<String>) -> Self {
        Self::new(AttributeType::SOFTWARE, text)
    }

    /// # Returns
    /// * `Err(StunError::AttributeSizeOverflow)` - text exceeds the limit of its type
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        if let Some(max) = max_size(self.attr) {
            if self.text.len() > max {
                return Err(StunError::AttributeSizeOverflow {
                    attr: self.attr,
                    got: self.text.len(),
                    max,
                });
            }
        }
        m.add(self.attr, self.text.as_bytes())
    }

    /// # Returns
    /// * `Err(StunError::AttributeNotFound)` - no attribute of type `attr`
    /// * `Err(StunError::InvalidUtf8)` - stored bytes are not UTF-8
    pub fn get_from_as(m: &Message, attr: AttributeType) -> Result<Self> {
        let value = m.get(attr)?;
        let text = std::str::from_utf8(value).map_err(|_| StunError::InvalidUtf8(attr))?;
        Ok(Self::new(attr, text))
    }
}

impl fmt::Display for TextAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn max_size(attr: AttributeType) -> Option<usize> {
    match attr {
        AttributeType::USERNAME => Some(MAX_USERNAME_SIZE),
        AttributeType::REALM => Some(MAX_REALM_SIZE),
        AttributeType::NONCE => Some(MAX_NONCE_SIZE),
        AttributeType::SOFTWARE => Some(MAX_SOFTWARE_SIZE),
        _ => None,
    }
}
