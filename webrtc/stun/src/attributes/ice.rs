//! ICE attributes (RFC 8445 Section 16.1)
//!
//! PRIORITY, USE-CANDIDATE, ICE-CONTROLLED and ICE-CONTROLLING carried by
//! connectivity check requests.

use crate::attribute_type::AttributeType;
use crate::errors::{Result, StunError};
use crate::message::Message;

const PRIORITY_SIZE: usize = 4;
const TIE_BREAKER_SIZE: usize = 8;

fn check_size(attr: AttributeType, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(StunError::AttributeSizeMismatch {
            attr,
            got,
            expected,
        });
    }
    Ok(())
}

fn get_exact<const N: usize>(m: &Message, attr: AttributeType) -> Result<[u8; N]> {
    let value = m.get(attr)?;
    check_size(attr, value.len(), N)?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(value);
    Ok(bytes)
}

/// Candidate priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Priority(pub u32);

impl Priority {
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(AttributeType::PRIORITY, &self.0.to_be_bytes())
    }

    pub fn get_from(m: &Message) -> Result<Self> {
        let bytes = get_exact::<PRIORITY_SIZE>(m, AttributeType::PRIORITY)?;
        Ok(Priority(u32::from_be_bytes(bytes)))
    }
}

/// Flag nominating the candidate pair; carries no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UseCandidate;

impl UseCandidate {
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(AttributeType::USE_CANDIDATE, &[])
    }

    pub fn is_set(m: &Message) -> bool {
        m.contains(AttributeType::USE_CANDIDATE)
    }
}

/// Tie-breaker of an agent in the controlled role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IceControlled(pub u64);

impl IceControlled {
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(AttributeType::ICE_CONTROLLED, &self.0.to_be_bytes())
    }

    pub fn get_from(m: &Message) -> Result<Self> {
        let bytes = get_exact::<TIE_BREAKER_SIZE>(m, AttributeType::ICE_CONTROLLED)?;
        Ok(IceControlled(u64::from_be_bytes(bytes)))
    }
}

/// Tie-breaker of an agent in the controlling role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IceControlling(pub u64);

impl IceControlling {
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(AttributeType::ICE_CONTROLLING, &self.0.to_be_bytes())
    }

    pub fn get_from(m: &Message) -> Result<Self> {
        let bytes = get_exact::<TIE_BREAKER_SIZE>(m, AttributeType::ICE_CONTROLLING)?;
        Ok(IceControlling(u64::from_be_bytes(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_type::MessageType;
    use crate::transaction_id::TransactionId;

    fn message() -> Message {
        Message::new(MessageType::BINDING_REQUEST, TransactionId([4; 12]))
    }

    #[test]
    fn test_priority() {
        let mut m = message();
        Priority(0x6E0001FF).add_to(&mut m).unwrap();
        assert_eq!(m.get(AttributeType::PRIORITY).unwrap(), &[0x6E, 0x00, 0x01, 0xFF]);
        assert_eq!(Priority::get_from(&m).unwrap(), Priority(0x6E0001FF));
    }

    #[test]
    fn test_use_candidate() {
        let mut m = message();
        assert!(!UseCandidate::is_set(&m));
        UseCandidate.add_to(&mut m).unwrap();
        assert!(UseCandidate::is_set(&m));
        assert_eq!(m.length, 4);
    }

    #[test]
    fn test_tie_breakers() {
        let mut m = message();
        IceControlling(0x932F_F9B1_5126_3B36).add_to(&mut m).unwrap();
        IceControlled(7).add_to(&mut m).unwrap();

        let decoded = Message::decode(&m.encode()).unwrap();
        assert_eq!(
            IceControlling::get_from(&decoded).unwrap(),
            IceControlling(0x932F_F9B1_5126_3B36)
        );
        assert_eq!(IceControlled::get_from(&decoded).unwrap(), IceControlled(7));
    }

    #[test]
    fn test_wrong_size() {
        let mut m = message();
        m.add(AttributeType::PRIORITY, &[1, 2, 3]).unwrap();
        assert_eq!(
            Priority::get_from(&m),
            Err(StunError::AttributeSizeMismatch {
                attr: AttributeType::PRIORITY,
                got: 3,
                expected: 4,
            })
        );
    }
}
