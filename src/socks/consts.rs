//! SOCKS5 protocol constants
//!
//! Only the subset of RFC 1928 this proxy speaks: no authentication,
//! CONNECT, IPv4 and domain addresses.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Commands
/// TCP CONNECT command
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;

// Reply codes
/// Succeeded
pub const SOCKS5_REPLY_SUCCEEDED: u8 = 0x00;
/// General SOCKS server failure, used for every kind of failure
pub const SOCKS5_REPLY_GENERAL_FAILURE: u8 = 0x01;

/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Frame sizes
/// VER CMD RSV ATYP
pub const REQUEST_HEADER_LEN: usize = 4;
/// Length of an IPv4 CONNECT request
pub const IPV4_REQUEST_LEN: usize = REQUEST_HEADER_LEN + 4 + 2;
/// Fixed part of a domain CONNECT request (header, length byte, port)
pub const DOMAIN_REQUEST_BASE_LEN: usize = REQUEST_HEADER_LEN + 1 + 2;
/// Length of every reply this proxy sends
pub const REPLY_LEN: usize = 10;
/// Maximum domain name length
pub const MAX_DOMAIN_LEN: usize = 255;
/// Largest legal handshake message (domain request with a 255 byte name)
pub const MAX_FRAME_LEN: usize = DOMAIN_REQUEST_BASE_LEN + MAX_DOMAIN_LEN;

/// Relay buffer size, one direction at a time
pub const RELAY_BUFFER_SIZE: usize = 1 << 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socks5_version() {
        assert_eq!(SOCKS5_VERSION, 5);
    }

    #[test]
    fn test_auth_methods() {
        assert_eq!(SOCKS5_AUTH_METHOD_NONE, 0);
        assert_eq!(SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE, 255);
    }

    #[test]
    fn test_address_types() {
        assert_eq!(SOCKS5_ADDR_TYPE_IPV4, 1);
        assert_eq!(SOCKS5_ADDR_TYPE_DOMAIN, 3);
    }

    #[test]
    fn test_frame_lengths() {
        assert_eq!(IPV4_REQUEST_LEN, 10);
        assert_eq!(DOMAIN_REQUEST_BASE_LEN, 7);
        assert_eq!(MAX_FRAME_LEN, 262);
        assert_eq!(RELAY_BUFFER_SIZE, 65536);
    }
}
