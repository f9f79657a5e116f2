//! STUN message builder
//!
//! This module provides a fluent builder API for constructing STUN messages.
//! Attributes are applied in the order they are given, which matters for
//! MESSAGE-INTEGRITY and FINGERPRINT: both cover everything added before them.

use crate::attributes::Attribute;
use crate::errors::Result;
use crate::message::Message;
use crate::message_type::MessageType;
use crate::transaction_id::TransactionId;

/// Builder for constructing STUN messages.
///
/// # When to Use
///
/// - Client-side, when sending Binding requests
/// - Server-side, when creating responses with attributes
/// - Tests that need predictable transaction IDs
///
/// ```
/// use stun::{Attribute, MessageBuilder, MessageType, TextAttribute};
///
/// let request = MessageBuilder::new(MessageType::BINDING_REQUEST)
///     .attribute(Attribute::Text(TextAttribute::software("roomrtc")))
///     .attribute(Attribute::Fingerprint)
///     .build()
///     .unwrap();
/// assert_eq!(request.attributes.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message_type: MessageType,
    transaction_id: Option<TransactionId>,
    attributes: Vec<Attribute>,
}

impl MessageBuilder {
    /// Creates a new message builder with the specified message type.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            transaction_id: None,
            attributes: Vec::new(),
        }
    }

    /// Uses a fixed transaction ID instead of a random one.
    pub fn transaction_id(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    /// Generates a fresh random transaction ID.
    pub fn random_transaction_id(mut self) -> Self {
        self.transaction_id = Some(TransactionId::new());
        self
    }

    /// Appends an attribute setter.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Builds the STUN message.
    ///
    /// A random transaction ID is generated when none was set.
    ///
    /// # Returns
    /// * `Ok(Message)` - The constructed message
    /// * `Err(StunError)` - If an attribute could not be added
    pub fn build(self) -> Result<Message> {
        let transaction_id = self.transaction_id.unwrap_or_else(TransactionId::new);

        let mut message = Message::new(self.message_type, transaction_id);
        message.build(&self.attributes)?;

        Ok(message)
    }
}
