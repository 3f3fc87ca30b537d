//! SOCKS5 type definitions
//!
//! Defines the decoded forms of the messages a client sends.

use super::consts::*;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Target address of a CONNECT request
///
/// Only IPv4 literals and domain names are accepted; IPv6 requests are
/// rejected by the decoder before a `TargetAddr` is ever built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    /// IPv4 address with port
    Ipv4(SocketAddrV4),
    /// Domain name with port
    Domain(String, u16),
}

impl TargetAddr {
    /// Create a new TargetAddr from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        TargetAddr::Ipv4(SocketAddrV4::new(ip, port))
    }

    /// Create a new TargetAddr from a domain name and port
    pub fn domain(domain: impl Into<String>, port: u16) -> Self {
        TargetAddr::Domain(domain.into(), port)
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        match self {
            TargetAddr::Ipv4(addr) => addr.port(),
            TargetAddr::Domain(_, port) => *port,
        }
    }

    /// Get the address type byte for SOCKS5 protocol
    pub fn addr_type(&self) -> u8 {
        match self {
            TargetAddr::Ipv4(_) => SOCKS5_ADDR_TYPE_IPV4,
            TargetAddr::Domain(_, _) => SOCKS5_ADDR_TYPE_DOMAIN,
        }
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAddr::Ipv4(addr) => write!(f, "{}", addr),
            TargetAddr::Domain(domain, port) => write!(f, "{}:{}", domain, port),
        }
    }
}

impl From<SocketAddrV4> for TargetAddr {
    fn from(addr: SocketAddrV4) -> Self {
        TargetAddr::Ipv4(addr)
    }
}

/// A decoded CONNECT request
///
/// The command is always CONNECT; anything else fails decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Where the client wants to go
    pub target: TargetAddr,
}

impl ConnectRequest {
    /// Create a request for the given target
    pub fn new(target: TargetAddr) -> Self {
        ConnectRequest { target }
    }
}
