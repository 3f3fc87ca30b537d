//! SOCKS5 module for ifsocks
//!
//! This module implements the no-authentication, CONNECT-only subset of
//! SOCKS5: method negotiation, request decoding, replies, and the relay
//! that carries a session once the outbound connection is up.

mod auth;
mod command;
mod consts;
mod frame;
mod handler;
mod tcp_relay;
mod types;

pub use auth::{negotiate, AuthMethod};
pub use command::{
    decode_request, parse_command, send_general_failure, send_reply, Reply, ReplyStatus,
};
pub use consts::*;
pub use frame::read_frame;
pub use handler::{handle_client, SessionConfig};
pub use tcp_relay::{Relay, RelayStats, Side};
pub use types::{ConnectRequest, TargetAddr};
