//! ERROR-CODE attribute
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           Reserved, should be 0         |Class|     Number    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      Reason Phrase (variable)                                ..
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::fmt;

use crate::attribute_type::AttributeType;
use crate::errors::{Result, StunError};
use crate::message::Message;

/// Maximum reason phrase size in bytes.
pub const ERROR_CODE_REASON_MAX: usize = 763;

const ERROR_CODE_REASON_START: usize = 4;
const ERROR_CODE_CLASS_BYTE: usize = 2;
const ERROR_CODE_NUMBER_BYTE: usize = 3;
const ERROR_CODE_MODULO: u16 = 100;

/// A STUN/TURN error code number, e.g. 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    pub const TRY_ALTERNATE: ErrorCode = ErrorCode(300);
    pub const BAD_REQUEST: ErrorCode = ErrorCode(400);
    pub const UNAUTHORIZED: ErrorCode = ErrorCode(401);
    pub const FORBIDDEN: ErrorCode = ErrorCode(403);
    pub const UNKNOWN_ATTRIBUTE: ErrorCode = ErrorCode(420);
    pub const ALLOCATION_MISMATCH: ErrorCode = ErrorCode(437);
    pub const STALE_NONCE: ErrorCode = ErrorCode(438);
    pub const ADDRESS_FAMILY_NOT_SUPPORTED: ErrorCode = ErrorCode(440);
    pub const WRONG_CREDENTIALS: ErrorCode = ErrorCode(441);
    pub const UNSUPPORTED_TRANSPORT_PROTOCOL: ErrorCode = ErrorCode(442);
    pub const ALLOCATION_QUOTA_REACHED: ErrorCode = ErrorCode(486);
    pub const ROLE_CONFLICT: ErrorCode = ErrorCode(487);
    pub const SERVER_ERROR: ErrorCode = ErrorCode(500);
    pub const INSUFFICIENT_CAPACITY: ErrorCode = ErrorCode(508);

    /// Hundreds digit.
    pub fn class(self) -> u8 {
        (self.0 / ERROR_CODE_MODULO) as u8
    }

    /// Code modulo 100.
    pub fn number(self) -> u8 {
        (self.0 % ERROR_CODE_MODULO) as u8
    }

    /// Reason phrase registered for well-known codes.
    pub fn default_reason(self) -> Option<&'static str> {
        let reason = match self {
            Self::TRY_ALTERNATE => "Try Alternate",
            Self::BAD_REQUEST => "Bad Request",
            Self::UNAUTHORIZED => "Unauthorized",
            Self::FORBIDDEN => "Forbidden",
            Self::UNKNOWN_ATTRIBUTE => "Unknown Attribute",
            Self::ALLOCATION_MISMATCH => "Allocation Mismatch",
            Self::STALE_NONCE => "Stale Nonce",
            Self::ADDRESS_FAMILY_NOT_SUPPORTED => "Address Family not Supported",
            Self::WRONG_CREDENTIALS => "Wrong Credentials",
            Self::UNSUPPORTED_TRANSPORT_PROTOCOL => "Unsupported Transport Protocol",
            Self::ALLOCATION_QUOTA_REACHED => "Allocation Quota Reached",
            Self::ROLE_CONFLICT => "Role Conflict",
            Self::SERVER_ERROR => "Server Error",
            Self::INSUFFICIENT_CAPACITY => "Insufficient Capacity",
            _ => return None,
        };
        Some(reason)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ERROR-CODE value: code plus human readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorCodeAttribute {
    pub code: ErrorCode,
    pub reason: String,
}

impl ErrorCodeAttribute {
    pub fn new(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Uses the registered reason phrase, or an empty one for unknown codes.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_reason().unwrap_or_default())
    }

    /// # Returns
    /// * `Err(StunError::AttributeSizeOverflow)` - reason longer than 763 bytes
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        let total = ERROR_CODE_REASON_START + self.reason.len();
        let max = ERROR_CODE_REASON_START + ERROR_CODE_REASON_MAX;
        if total > max {
            return Err(StunError::AttributeSizeOverflow {
                attr: AttributeType::ERROR_CODE,
                got: total,
                max,
            });
        }

        let mut value = vec![0u8; ERROR_CODE_REASON_START];
        value[ERROR_CODE_CLASS_BYTE] = self.code.class();
        value[ERROR_CODE_NUMBER_BYTE] = self.code.number();
        value.extend_from_slice(self.reason.as_bytes());

        m.add(AttributeType::ERROR_CODE, &value)
    }

    /// # Returns
    /// * `Err(StunError::UnexpectedEof)` - value shorter than 4 bytes
    /// * `Err(StunError::InvalidUtf8)` - reason is not UTF-8
    pub fn get_from(m: &Message) -> Result<Self> {
        let value = m.get(AttributeType::ERROR_CODE)?;
        if value.len() < ERROR_CODE_REASON_START {
            return Err(StunError::UnexpectedEof);
        }

        let class = value[ERROR_CODE_CLASS_BYTE] as u16;
        let number = value[ERROR_CODE_NUMBER_BYTE] as u16;
        let reason = std::str::from_utf8(&value[ERROR_CODE_REASON_START..])
            .map_err(|_| StunError::InvalidUtf8(AttributeType::ERROR_CODE))?;

        Ok(Self {
            code: ErrorCode(class * ERROR_CODE_MODULO + number),
            reason: reason.to_string(),
        })
    }
}

impl fmt::Display for ErrorCodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}
