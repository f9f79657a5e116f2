//! XOR-MAPPED-ADDRESS attribute
//!
//! This module implements the XOR-MAPPED-ADDRESS attribute according to RFC 5389.
//! XOR-MAPPED-ADDRESS is the preferred method for conveying reflexive addresses
//! as it XORs the address with the magic cookie and transaction ID, so NATs that
//! rewrite addresses found in payloads leave it alone.
//!
//! The same encoding is reused by TURN's XOR-PEER-ADDRESS and XOR-RELAYED-ADDRESS.

use std::net::{IpAddr, SocketAddr};

use crate::attribute_type::AttributeType;
use crate::attributes::address::{family_and_octets, ip_from_octets, split_address_value};
use crate::errors::Result;
use crate::message::Message;
use crate::message_header::MAGIC_COOKIE;
use crate::transaction_id::TransactionId;

/// Port mask: the most significant 16 bits of the magic cookie.
const MAGIC_COOKIE_HIGH: u16 = (MAGIC_COOKIE >> 16) as u16;

/// A transport address obfuscated with the magic cookie and transaction ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorMappedAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl XorMappedAddress {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            ip: addr.ip(),
            port: addr.port(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Adds the address as XOR-MAPPED-ADDRESS, keyed by `m`'s transaction ID.
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, AttributeType::XOR_MAPPED_ADDRESS)
    }

    pub fn add_to_as(&self, m: &mut Message, attr_type: AttributeType) -> Result<()> {
        let (family, mut octets) = family_and_octets(self.ip);
        xor_in_place(&mut octets, &m.transaction_id);

        let mut value = Vec::with_capacity(4 + octets.len());
        value.extend_from_slice(&family.to_be_bytes());
        value.extend_from_slice(&(self.port ^ MAGIC_COOKIE_HIGH).to_be_bytes());
        value.extend_from_slice(&octets);

        m.add(attr_type, &value)
    }

    /// Reads XOR-MAPPED-ADDRESS.
    ///
    /// # Returns
    /// * `Err(StunError::AttributeNotFound)` - attribute absent
    /// * `Err(StunError::UnexpectedEof)` - value of 4 bytes or less
    /// * `Err(StunError::InvalidAddressFamily)` - family other than 1 or 2
    /// * `Err(StunError::BadIpLength)` - address length disagrees with family
    pub fn get_from(m: &Message) -> Result<Self> {
        Self::get_from_as(m, AttributeType::XOR_MAPPED_ADDRESS)
    }

    pub fn get_from_as(m: &Message, attr_type: AttributeType) -> Result<Self> {
        let value = m.get(attr_type)?;
        let (family, xor_port, address) = split_address_value(value)?;

        let mut octets = address.to_vec();
        xor_in_place(&mut octets, &m.transaction_id);

        Ok(Self {
            ip: ip_from_octets(family, &octets)?,
            port: xor_port ^ MAGIC_COOKIE_HIGH,
        })
    }
}

/// XORs `octets` with the keystream `magic cookie || transaction ID`.
///
/// IPv4 addresses only consume the cookie part.
fn xor_in_place(octets: &mut [u8], transaction_id: &TransactionId) {
    let cookie = MAGIC_COOKIE.to_be_bytes();
    let keystream = cookie.iter().chain(transaction_id.0.iter());
    for (byte, key) in octets.iter_mut().zip(keystream) {
        *byte ^= key;
    }
}
