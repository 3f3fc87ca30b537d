//! Error types for ifsocks
//!
//! Every failure that can end a client connection is a [`ProxyError`].
//! Malformed client messages are described in more detail by [`Socks5Error`].

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Terminal error for one proxied connection
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Socket read/write failure on the client or remote side
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// Malformed or version-mismatched client message
    #[error("Protocol error: {0}")]
    Protocol(#[from] Socks5Error),

    /// The client did not offer the "no authentication" method
    #[error("No acceptable authentication method")]
    MethodUnsupported,

    /// Domain lookup failed or produced no IPv4 address
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Outbound connection could not be established
    #[error("Connect error: {0}")]
    Connect(io::Error),

    /// No traffic in either direction for the configured window
    #[error("Idle timeout after {0:?}")]
    IdleTimeout(Duration),

    /// Greeting or request not received within the configured window
    #[error("Handshake timeout after {0:?}")]
    HandshakeTimeout(Duration),
}

/// SOCKS5 specific protocol faults
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Socks5Error {
    /// Unsupported SOCKS version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Greeting with an empty method list
    #[error("No authentication methods provided")]
    NoMethods,

    /// Command not supported
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Reserved byte was not zero
    #[error("Invalid reserved byte: {0}")]
    InvalidReserved(u8),

    /// Address type not supported
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Message carried more bytes than its header declares
    #[error("Message length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Length implied by the header
        expected: usize,
        /// Bytes actually received
        actual: usize,
    },

    /// Peer closed the stream before a full message arrived
    #[error("Truncated message: got {0} bytes before EOF")]
    Truncated(usize),

    /// Message exceeded the largest legal handshake frame
    #[error("Message too large: {0} bytes")]
    MessageTooLarge(usize),

    /// Invalid domain name
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),
}
