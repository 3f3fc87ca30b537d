//! Target name resolution
//!
//! Lookups go through the system resolver. They are not bound to the
//! outbound interface, so DNS queries follow the default route.

use crate::error::ProxyError;
use crate::socks::TargetAddr;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::lookup_host;

/// Resolve a domain name to its first IPv4 address
pub async fn resolve_ipv4(domain: &str) -> Result<Ipv4Addr, ProxyError> {
    let addrs = lookup_host((domain, 0))
        .await
        .map_err(|e| ProxyError::Resolution(format!("Failed to resolve {}: {}", domain, e)))?;

    let mut ipv4 = addrs.filter_map(|addr| match addr {
        SocketAddr::V4(v4) => Some(*v4.ip()),
        SocketAddr::V6(_) => None,
    });

    ipv4.next()
        .ok_or_else(|| ProxyError::Resolution(format!("No IPv4 address found for {}", domain)))
}

/// Turn a request target into a connectable IPv4 socket address
pub async fn resolve_target(target: &TargetAddr) -> Result<SocketAddrV4, ProxyError> {
    match target {
        TargetAddr::Ipv4(addr) => Ok(*addr),
        TargetAddr::Domain(domain, port) => {
            let ip = resolve_ipv4(domain).await?;
            tracing::debug!("Resolved {} to {} via system resolver", domain, ip);
            Ok(SocketAddrV4::new(ip, *port))
        }
    }
}
