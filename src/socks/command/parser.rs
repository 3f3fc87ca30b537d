//! SOCKS5 CONNECT request parser
//!
//! Parses the client's request and validates its length against the
//! address type it announces.

use crate::error::{ProxyError, Socks5Error};
use crate::socks::consts::*;
use crate::socks::frame::read_frame;
use crate::socks::types::{ConnectRequest, TargetAddr};
use std::net::Ipv4Addr;
use tokio::io::AsyncRead;

/// Read and parse a CONNECT request from the stream
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Any failure here still owes the client a reply; sending it is left to
/// the caller.
pub async fn parse_command<S>(stream: &mut S) -> Result<ConnectRequest, ProxyError>
where
    S: AsyncRead + Unpin,
{
    let frame = read_frame(stream, request_len).await?;
    let request = decode_request(&frame)?;

    tracing::debug!("Parsed SOCKS5 CONNECT to {}", request.target);

    Ok(request)
}

/// Total request length once the header makes it known
///
/// Header fields are validated as soon as they arrive.
fn request_len(buf: &[u8]) -> Result<Option<usize>, Socks5Error> {
    if let Some(&version) = buf.first() {
        if version != SOCKS5_VERSION {
            return Err(Socks5Error::UnsupportedVersion(version));
        }
    }
    if let Some(&cmd) = buf.get(1) {
        if cmd != SOCKS5_CMD_TCP_CONNECT {
            return Err(Socks5Error::CommandNotSupported(cmd));
        }
    }
    if let Some(&reserved) = buf.get(2) {
        if reserved != SOCKS5_RESERVED {
            return Err(Socks5Error::InvalidReserved(reserved));
        }
    }

    match buf.get(3) {
        None => Ok(None),
        Some(&SOCKS5_ADDR_TYPE_IPV4) => Ok(Some(IPV4_REQUEST_LEN)),
        Some(&SOCKS5_ADDR_TYPE_DOMAIN) => Ok(buf
            .get(REQUEST_HEADER_LEN)
            .map(|&len| DOMAIN_REQUEST_BASE_LEN + len as usize)),
        Some(&other) => Err(Socks5Error::AddressTypeNotSupported(other)),
    }
}

/// Decode a complete request frame
///
/// The frame length must be exactly what its address type implies.
pub fn decode_request(frame: &[u8]) -> Result<ConnectRequest, Socks5Error> {
    let expected = request_len(frame)?.ok_or(Socks5Error::Truncated(frame.len()))?;
    if frame.len() != expected {
        return Err(Socks5Error::LengthMismatch {
            expected,
            actual: frame.len(),
        });
    }

    let addr = &frame[REQUEST_HEADER_LEN..];
    let target = match frame[3] {
        SOCKS5_ADDR_TYPE_IPV4 => {
            let ip = Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3]);
            let port = u16::from_be_bytes([addr[4], addr[5]]);
            TargetAddr::ipv4(ip, port)
        }
        SOCKS5_ADDR_TYPE_DOMAIN => {
            let len = addr[0] as usize;
            if len == 0 {
                return Err(Socks5Error::InvalidDomain(String::new()));
            }

            let name = &addr[1..1 + len];
            let domain = std::str::from_utf8(name)
                .map_err(|_| Socks5Error::InvalidDomain(String::from_utf8_lossy(name).into_owned()))?;
            let port = u16::from_be_bytes([addr[1 + len], addr[2 + len]]);
            TargetAddr::domain(domain, port)
        }
        other => return Err(Socks5Error::AddressTypeNotSupported(other)),
    };

    Ok(ConnectRequest::new(target))
}
