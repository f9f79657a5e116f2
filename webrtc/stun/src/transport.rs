//! Outbound datagrams produced by the client.

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

/// Transport the embedding application sends a [`Transmit`] over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportProtocol {
    #[default]
    Udp,
    Tcp,
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportProtocol::Udp => f.write_str("UDP"),
            TransportProtocol::Tcp => f.write_str("TCP"),
        }
    }
}

/// Bytes the caller must put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmit {
    /// Time the transmit was produced.
    pub now: Instant,
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub protocol: TransportProtocol,
    pub payload: Vec<u8>,
}
