//! SOCKS5 command parsing module
//!
//! Handles parsing CONNECT requests and building replies.

mod parser;
mod reply;

pub use parser::{decode_request, parse_command};
pub use reply::{send_general_failure, send_reply, Reply, ReplyStatus};
