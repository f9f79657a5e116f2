//! STUN error types
//!
//! This module defines the error types used throughout the STUN implementation.
//! Errors fall into three groups:
//!
//! - malformed input, returned while decoding untrusted bytes;
//! - policy violations, returned while building a message;
//! - transaction lifecycle misuse, returned by the agent and client.
//!
//! Timeouts and closure of individual transactions are not returned from
//! calls; they arrive as failed [`crate::Event`]s carrying
//! [`StunError::TransactionTimeOut`], [`StunError::TransactionStopped`] or
//! [`StunError::AgentClosed`].

use crate::attribute_type::AttributeType;

/// Result type for STUN operations.
pub type Result<T> = std::result::Result<T, StunError>;

/// Errors that can occur during STUN operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StunError {
    /// Buffer shorter than the 20-byte message header
    UnexpectedHeaderEof,
    /// Magic cookie field does not carry 0x2112A442
    InvalidMagicCookie(u32),
    /// Header length field disagrees with the number of bytes received
    MessageLengthMismatch { declared: usize, available: usize },
    /// Attribute header or value runs past the end of the buffer
    UnexpectedEof,
    /// Padded attribute value larger than what remains of the message
    AttributeSizeInvalid,
    /// Attribute value has a different size than its format requires
    AttributeSizeMismatch {
        attr: AttributeType,
        got: usize,
        expected: usize,
    },
    /// Attribute value is larger than its format allows
    AttributeSizeOverflow {
        attr: AttributeType,
        got: usize,
        max: usize,
    },
    /// Requested attribute is not present in the message
    AttributeNotFound(AttributeType),
    /// Address family other than IPv4 (1) or IPv6 (2)
    InvalidAddressFamily(u16),
    /// Address bytes do not match the declared family
    BadIpLength,
    /// UNKNOWN-ATTRIBUTES value with an odd number of bytes
    BadUnknownAttributesSize,
    /// Text attribute that is not valid UTF-8
    InvalidUtf8(AttributeType),
    /// MESSAGE-INTEGRITY value does not match the recomputed HMAC
    IntegrityMismatch,
    /// FINGERPRINT value does not match the recomputed CRC-32
    FingerprintMismatch { expected: u32, actual: u32 },
    /// MESSAGE-INTEGRITY added to a message already carrying FINGERPRINT
    FingerprintBeforeIntegrity,
    /// Agent has been closed
    AgentClosed,
    /// Client has been closed
    ClientClosed,
    /// A transaction with this id is already tracked
    TransactionExists,
    /// No transaction with this id is tracked
    TransactionNotExists,
    /// Transaction was stopped by the caller
    TransactionStopped,
    /// Transaction deadline passed without a response
    TransactionTimeOut,
    /// Settings could not be loaded or interpreted
    Config(String),
    /// HMAC could not be keyed
    Crypto(String),
}

impl std::fmt::Display for StunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StunError::UnexpectedHeaderEof => write!(f, "Unexpected EOF: not enough bytes to read header"),
            StunError::InvalidMagicCookie(cookie) => {
                write!(f, "Invalid magic cookie: 0x{:08X}", cookie)
            }
            StunError::MessageLengthMismatch {
                declared,
                available,
            } => write!(
                f,
                "Message length mismatch: header declares {} bytes, {} available",
                declared, available
            ),
            StunError::UnexpectedEof => write!(f, "Unexpected EOF"),
            StunError::AttributeSizeInvalid => write!(f, "Attribute size is invalid"),
            StunError::AttributeSizeMismatch {
                attr,
                got,
                expected,
            } => write!(f, "Incorrect length of {}: got {}, expected {}", attr, got, expected),
            StunError::AttributeSizeOverflow { attr, got, max } => {
                write!(f, "Attribute {} overflows: {} > {}", attr, got, max)
            }
            StunError::AttributeNotFound(attr) => write!(f, "Attribute not found: {}", attr),
            StunError::InvalidAddressFamily(fam) => {
                write!(f, "Invalid address family: 0x{:04X}", fam)
            }
            StunError::BadIpLength => write!(f, "Invalid length of IP value"),
            StunError::BadUnknownAttributesSize => {
                write!(f, "Bad UNKNOWN-ATTRIBUTES size")
            }
            StunError::InvalidUtf8(attr) => write!(f, "Attribute {} is not valid UTF-8", attr),
            StunError::IntegrityMismatch => write!(f, "Integrity check failed"),
            StunError::FingerprintMismatch { expected, actual } => write!(
                f,
                "Fingerprint check failed: 0x{:08X} (expected) != 0x{:08X} (actual)",
                expected, actual
            ),
            StunError::FingerprintBeforeIntegrity => {
                write!(f, "FINGERPRINT before MESSAGE-INTEGRITY attribute")
            }
            StunError::AgentClosed => write!(f, "Agent is closed"),
            StunError::ClientClosed => write!(f, "Client is closed"),
            StunError::TransactionExists => write!(f, "Transaction exists with same id"),
            StunError::TransactionNotExists => write!(f, "Transaction not exists"),
            StunError::TransactionStopped => write!(f, "Transaction is stopped"),
            StunError::TransactionTimeOut => write!(f, "Transaction is timed out"),
            StunError::Config(msg) => write!(f, "Configuration error: {}", msg),
            StunError::Crypto(msg) => write!(f, "Crypto error: {}", msg),
        }
    }
}

impl std::error::Error for StunError {}

impl From<config_loader::ConfigError> for StunError {
    fn from(err: config_loader::ConfigError) -> Self {
        StunError::Config(err.to_string())
    }
}
