//! Interface-bound outbound connector
//!
//! Outbound sockets are pinned to a network device with `SO_BINDTODEVICE`
//! rather than bound to a local address, so the kernel routes them over
//! that link no matter what the default route says.

use super::SocketOpts;
use crate::error::ProxyError;
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};
use tracing::{debug, warn};

/// Connect to `addr` with egress pinned to `interface`
///
/// `connect_timeout` of `None` waits as long as the kernel does.
pub async fn connect_bound(
    addr: SocketAddrV4,
    interface: &str,
    opts: &SocketOpts,
    connect_timeout: Option<Duration>,
) -> Result<TcpStream, ProxyError> {
    let socket = TcpSocket::new_v4().map_err(ProxyError::Connect)?;
    bind_to_interface(&socket, interface).map_err(ProxyError::Connect)?;

    debug!("Connecting to {} via {}", addr, interface);

    let connect = socket.connect(SocketAddr::V4(addr));
    let result = match connect_timeout {
        Some(limit) => match tokio::time::timeout(limit, connect).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connect to {} timed out after {:?}", addr, limit),
            )),
        },
        None => connect.await,
    };
    let stream = result.map_err(ProxyError::Connect)?;

    if let Err(e) = opts.apply(&stream) {
        warn!("Failed to apply socket options: {}", e);
    }

    Ok(stream)
}

/// Pin a socket's egress to the named device
#[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
pub fn bind_to_interface(socket: &TcpSocket, interface: &str) -> io::Result<()> {
    socket2::SockRef::from(socket)
        .bind_device(Some(interface.as_bytes()))
        .map_err(|e| io::Error::new(e.kind(), format!("bind to device {}: {}", interface, e)))
}

/// Pin a socket's egress to the named device
#[cfg(not(any(target_os = "android", target_os = "fuchsia", target_os = "linux")))]
pub fn bind_to_interface(_socket: &TcpSocket, interface: &str) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("binding to device {} is not supported on this platform", interface),
    ))
}
