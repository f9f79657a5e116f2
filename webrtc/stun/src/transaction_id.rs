//! 96-bit STUN transaction identifiers.

use rand::Rng;
use std::fmt;

/// Size of a transaction id in bytes.
pub const TRANSACTION_ID_SIZE: usize = 12;

/// Identifier correlating a request with its response.
///
/// Besides keying transactions, the id is part of the XOR keystream used to
/// obfuscate IPv6 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_SIZE]);

impl TransactionId {
    /// Generates a cryptographically random transaction id.
    pub fn new() -> Self {
        let mut id = [0u8; TRANSACTION_ID_SIZE];
        rand::thread_rng().fill(&mut id[..]);
        TransactionId(id)
    }

    pub fn as_bytes(&self) -> &[u8; TRANSACTION_ID_SIZE] {
        &self.0
    }
}

impl From<[u8; TRANSACTION_ID_SIZE]> for TransactionId {
    fn from(bytes: [u8; TRANSACTION_ID_SIZE]) -> Self {
        TransactionId(bytes)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
