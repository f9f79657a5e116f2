//! UNKNOWN-ATTRIBUTES attribute
//!
//! Sent in a 420 error response to list the comprehension-required
//! attributes the server did not understand.

use std::fmt;

use crate::attribute_type::AttributeType;
use crate::errors::{Result, StunError};
use crate::message::Message;
use crate::message_header::read_u16;

const ATTRIBUTE_TYPE_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnknownAttributes(pub Vec<AttributeType>);

impl UnknownAttributes {
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        let value: Vec<u8> = self
            .0
            .iter()
            .flat_map(|t| t.to_u16().to_be_bytes())
            .collect();
        m.add(AttributeType::UNKNOWN_ATTRIBUTES, &value)
    }

    /// # Returns
    /// * `Err(StunError::BadUnknownAttributesSize)` - odd number of value bytes
    pub fn get_from(m: &Message) -> Result<Self> {
        let value = m.get(AttributeType::UNKNOWN_ATTRIBUTES)?;
        if value.len() % ATTRIBUTE_TYPE_SIZE != 0 {
            return Err(StunError::BadUnknownAttributesSize);
        }

        Ok(UnknownAttributes(
            value
                .chunks_exact(ATTRIBUTE_TYPE_SIZE)
                .map(|chunk| AttributeType(read_u16(chunk)))
                .collect(),
        ))
    }
}

impl fmt::Display for UnknownAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<nil>");
        }
        let names: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_type::MessageType;
    use crate::transaction_id::TransactionId;

    fn message() -> Message {
        Message::new(MessageType::BINDING_ERROR, TransactionId([2; 12]))
    }

    #[test]
    fn test_round_trip_with_padding() {
        let unknown = UnknownAttributes(vec![
            AttributeType::USERNAME,
            AttributeType(0x7F00),
            AttributeType::REALM,
        ]);
        let mut m = message();
        unknown.add_to(&mut m).unwrap();

        // 6 value bytes padded to 8
        assert_eq!(m.length, 4 + 8);
        let decoded = UnknownAttributes::get_from(&Message::decode(&m.encode()).unwrap()).unwrap();
        assert_eq!(decoded, unknown);
    }

    #[test]
    fn test_odd_size_rejected() {
        let mut m = message();
        m.add(AttributeType::UNKNOWN_ATTRIBUTES, &[0, 6, 0]).unwrap();
        assert_eq!(
            UnknownAttributes::get_from(&m),
            Err(StunError::BadUnknownAttributesSize)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(UnknownAttributes::default().to_string(), "<nil>");
        assert_eq!(
            UnknownAttributes(vec![AttributeType::USERNAME, AttributeType(0x7F00)]).to_string(),
            "USERNAME, 0x7F00"
        );
    }
}
