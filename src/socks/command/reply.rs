//! SOCKS5 reply builder
//!
//! Every reply is 10 bytes with an IPv4 bound address. Failures are not
//! distinguished on the wire; they all carry the general failure code.

use crate::socks::consts::*;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Reply status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Connection established
    Succeeded,
    /// Anything went wrong
    GeneralFailure,
}

impl ReplyStatus {
    /// Convert to SOCKS5 reply byte
    pub fn to_byte(self) -> u8 {
        match self {
            ReplyStatus::Succeeded => SOCKS5_REPLY_SUCCEEDED,
            ReplyStatus::GeneralFailure => SOCKS5_REPLY_GENERAL_FAILURE,
        }
    }
}

/// A SOCKS5 reply to a CONNECT request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Status code
    pub status: ReplyStatus,
    /// Bound address reported to the client
    pub bound: SocketAddrV4,
}

impl Reply {
    /// Reply with an explicit status and bound address
    pub fn new(status: ReplyStatus, bound: SocketAddrV4) -> Self {
        Reply { status, bound }
    }

    /// Success reply carrying the proxy's client-facing local endpoint
    pub fn success(bound: SocketAddrV4) -> Self {
        Reply::new(ReplyStatus::Succeeded, bound)
    }

    /// Failure reply with a zero address
    pub fn failure() -> Self {
        Reply::new(
            ReplyStatus::GeneralFailure,
            SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
        )
    }

    /// Success reply for a local endpoint of any family
    ///
    /// Non-IPv4 endpoints cannot be expressed in our fixed frame and are
    /// reported as `0.0.0.0:0`.
    pub fn success_from(local: SocketAddr) -> Self {
        match local {
            SocketAddr::V4(addr) => Reply::success(addr),
            SocketAddr::V6(_) => Reply::success(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)),
        }
    }

    /// Serialize the reply
    ///
    /// # SOCKS5 Reply Format
    ///
    /// ```text
    /// +----+-----+-------+------+----------+----------+
    /// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
    /// +----+-----+-------+------+----------+----------+
    /// | 1  |  1  | X'00' | X'01'|    4     |    2     |
    /// +----+-----+-------+------+----------+----------+
    /// ```
    pub fn to_bytes(&self) -> [u8; REPLY_LEN] {
        let ip = self.bound.ip().octets();
        let port = self.bound.port().to_be_bytes();

        [
            SOCKS5_VERSION,
            self.status.to_byte(),
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
            ip[0],
            ip[1],
            ip[2],
            ip[3],
            port[0],
            port[1],
        ]
    }
}

/// Write a reply and flush it
pub async fn send_reply<S>(stream: &mut S, reply: &Reply) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(&reply.to_bytes()).await?;
    stream.flush().await
}

/// Best-effort general failure reply
///
/// The connection is being torn down anyway, so a write error is only logged.
pub async fn send_general_failure<S>(stream: &mut S)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = send_reply(stream, &Reply::failure()).await {
        tracing::debug!("Failed to send failure reply: {}", e);
    }
}
