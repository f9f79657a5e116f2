//! STUN Module - Session Traversal Utilities for NAT
//!
//! Implementation of STUN (Session Traversal Utilities for NAT) as per RFC 5389:
//!
//! - a message codec with typed attributes, including MESSAGE-INTEGRITY
//!   and FINGERPRINT;
//! - a transaction [`Agent`] tracking outstanding requests;
//! - a retransmitting [`Client`] built on top of the agent.
//!
//! Nothing here opens sockets or spawns threads. The embedding application
//! moves bytes and time in and out through the client's `handle_*` and
//! `poll_*` methods.

pub mod agent;
pub mod attribute_type;
pub mod attributes;
pub mod client;
pub mod errors;
pub mod message;
pub mod message_builder;
pub mod message_header;
pub mod message_type;
pub mod transaction_id;
pub mod transport;

pub use agent::{Agent, AgentTransaction, Event};
pub use attribute_type::AttributeType;
pub use attributes::{
    Attribute, ErrorCode, ErrorCodeAttribute, Fingerprint, IceControlled, IceControlling,
    MappedAddress, MessageIntegrity, Priority, TextAttribute, UnknownAttributes, UseCandidate,
    XorMappedAddress,
};
pub use client::{
    Client, ClientBuilder, ClientEvent, ClientInput, ClientSettings, ClientTransaction,
};
pub use errors::{Result, StunError};
pub use message::{Message, RawAttribute};
pub use message_builder::MessageBuilder;
pub use message_header::{HEADER_SIZE, MAGIC_COOKIE, is_message};
pub use message_type::{MessageClass, MessageType, Method};
pub use transaction_id::TransactionId;
pub use transport::{Transmit, TransportProtocol};
