//! MAPPED-ADDRESS and ALTERNATE-SERVER attributes
//!
//! Both carry a plain transport address:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |0 0 0 0 0 0 0 0|    Family     |           Port                |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                 Address (32 bits or 128 bits)                 |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::attribute_type::AttributeType;
use crate::errors::{Result, StunError};
use crate::message::Message;
use crate::message_header::read_u16;

/// Address family values according to RFC 5389.
pub(crate) const FAMILY_IPV4: u16 = 0x01;
pub(crate) const FAMILY_IPV6: u16 = 0x02;

pub(crate) const IPV4_LEN: usize = 4;
pub(crate) const IPV6_LEN: usize = 16;

/// Family + port prefix shared by every address attribute.
pub(crate) const ADDRESS_PREFIX_LEN: usize = 4;

/// An un-obfuscated transport address attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl MappedAddress {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            ip: addr.ip(),
            port: addr.port(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Adds the address as MAPPED-ADDRESS.
    pub fn add_to(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, AttributeType::MAPPED_ADDRESS)
    }

    /// Adds the address under an arbitrary address-format attribute type.
    pub fn add_to_as(&self, m: &mut Message, attr_type: AttributeType) -> Result<()> {
        let (family, octets) = family_and_octets(self.ip);

        let mut value = Vec::with_capacity(ADDRESS_PREFIX_LEN + octets.len());
        value.extend_from_slice(&family.to_be_bytes());
        value.extend_from_slice(&self.port.to_be_bytes());
        value.extend_from_slice(&octets);

        m.add(attr_type, &value)
    }

    /// Reads MAPPED-ADDRESS.
    pub fn get_from(m: &Message) -> Result<Self> {
        Self::get_from_as(m, AttributeType::MAPPED_ADDRESS)
    }

    pub fn get_from_as(m: &Message, attr_type: AttributeType) -> Result<Self> {
        let value = m.get(attr_type)?;
        let (family, port, address) = split_address_value(value)?;
        Ok(Self {
            ip: ip_from_octets(family, address)?,
            port,
        })
    }
}

/// Splits an address value into family, raw port and address bytes,
/// checking the address length against the family.
pub(crate) fn split_address_value(value: &[u8]) -> Result<(u16, u16, &[u8])> {
    if value.len() <= ADDRESS_PREFIX_LEN {
        return Err(StunError::UnexpectedEof);
    }

    let family = read_u16(&value[0..2]);
    let expected = match family {
        FAMILY_IPV4 => IPV4_LEN,
        FAMILY_IPV6 => IPV6_LEN,
        other => return Err(StunError::InvalidAddressFamily(other)),
    };

    let address = &value[ADDRESS_PREFIX_LEN..];
    if address.len() != expected {
        return Err(StunError::BadIpLength);
    }

    Ok((family, read_u16(&value[2..4]), address))
}

pub(crate) fn family_and_octets(ip: IpAddr) -> (u16, Vec<u8>) {
    match ip {
        IpAddr::V4(v4) => (FAMILY_IPV4, v4.octets().to_vec()),
        IpAddr::V6(v6) => (FAMILY_IPV6, v6.octets().to_vec()),
    }
}

/// Builds an address from bytes already validated by [`split_address_value`].
pub(crate) fn ip_from_octets(family: u16, octets: &[u8]) -> Result<IpAddr> {
    match family {
        FAMILY_IPV4 => {
            let bytes: [u8; IPV4_LEN] = octets.try_into().map_err(|_| StunError::BadIpLength)?;
            Ok(IpAddr::V4(Ipv4Addr::from(bytes)))
        }
        FAMILY_IPV6 => {
            let bytes: [u8; IPV6_LEN] = octets.try_into().map_err(|_| StunError::BadIpLength)?;
            Ok(IpAddr::V6(Ipv6Addr::from(bytes)))
        }
        other => Err(StunError::InvalidAddressFamily(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_type::MessageType;
    use crate::transaction_id::TransactionId;

    fn message() -> Message {
        Message::new(MessageType::BINDING_SUCCESS, TransactionId([0; 12]))
    }

    #[test]
    fn test_mapped_address_ipv4_layout() {
        let mut m = message();
        let addr = MappedAddress::new("192.168.1.100:8080".parse().unwrap());
        addr.add_to(&mut m).unwrap();

        assert_eq!(
            m.get(AttributeType::MAPPED_ADDRESS).unwrap(),
            &[0x00, 0x01, 0x1F, 0x90, 192, 168, 1, 100]
        );
        assert_eq!(MappedAddress::get_from(&m).unwrap(), addr);
    }

    #[test]
    fn test_alternate_server_ipv6() {
        let mut m = message();
        let addr = MappedAddress::new("[2001:db8::1]:3478".parse().unwrap());
        addr.add_to_as(&mut m, AttributeType::ALTERNATE_SERVER).unwrap();

        let decoded = MappedAddress::get_from_as(&m, AttributeType::ALTERNATE_SERVER).unwrap();
        assert_eq!(decoded.socket_addr(), addr.socket_addr());
        assert!(MappedAddress::get_from(&m).is_err());
    }

    #[test]
    fn test_split_rejects_short_and_mismatched_values() {
        assert_eq!(
            split_address_value(&[0, 1, 0, 80]).unwrap_err(),
            StunError::UnexpectedEof
        );
        assert_eq!(
            split_address_value(&[0, 1, 0, 80, 1, 2, 3]).unwrap_err(),
            StunError::BadIpLength
        );
        assert_eq!(
            split_address_value(&[0, 2, 0, 80, 1, 2, 3, 4]).unwrap_err(),
            StunError::BadIpLength
        );
        assert_eq!(
            split_address_value(&[0, 3, 0, 80, 1, 2, 3, 4]).unwrap_err(),
            StunError::InvalidAddressFamily(3)
        );
    }
}
