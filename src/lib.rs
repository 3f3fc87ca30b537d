//! # ifsocks - Interface-Bound SOCKS5 Proxy
//!
//! ifsocks is a small SOCKS5 proxy server that forces every outbound
//! connection it makes through one named network interface, such as a VPN
//! tunnel device, regardless of the host routing table.
//!
//! ## Features
//!
//! - **No-Auth CONNECT**: SOCKS5 method negotiation without authentication
//!   and TCP CONNECT to IPv4 or domain-name targets
//! - **Interface Binding**: Outbound sockets are bound to a device with
//!   `SO_BINDTODEVICE` before connecting
//! - **Idle Timeout**: Sessions with no traffic in either direction for the
//!   configured window are torn down
//! - **Task Per Connection**: Sessions run concurrently and fail independently
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ifsocks::config::load_config;
//! use ifsocks::server::run_server;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("ifsocks.toml")?;
//!     let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_server(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! SOCKS5 Client -> ifsocks (listen addr) -> [interface] -> Target
//! ```
//!
//! Domain names are resolved with the system resolver, which is not bound
//! to the interface.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod server;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config};
pub use error::{ProxyError, Socks5Error};
pub use server::{run_server, Server};

/// Version of the ifsocks library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
