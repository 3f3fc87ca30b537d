//! Server configuration types
//!
//! Defines the main configuration structures for the ifsocks server.

use super::TcpConfig;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Longest accepted timeout in seconds (one year)
pub const MAX_TIMEOUT_SECS: u64 = 86400 * 365;

/// Longest interface name the kernel accepts (IFNAMSIZ minus the NUL)
pub const MAX_INTERFACE_NAME_LEN: usize = 15;

fn default_listen_addr() -> Ipv4Addr {
    Ipv4Addr::LOCALHOST
}

fn default_listen_port() -> u16 {
    1080
}

/// Default idle timeout in seconds
fn default_idle_timeout() -> u64 {
    60
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Listener and session settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound socket tuning
    #[serde(default)]
    pub tcp: TcpConfig,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Network interface all outbound connections are bound to (e.g. "tun0")
    #[serde(default)]
    pub interface: String,

    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: Ipv4Addr,

    /// Port to listen on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Relay inactivity timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,

    /// Log per-connection lifecycle events
    #[serde(default)]
    pub verbose: bool,

    /// Bound on greeting and request reads in seconds, unbounded if unset
    #[serde(default)]
    pub handshake_timeout: Option<u64>,

    /// Bound on the outbound connect in seconds, unbounded if unset
    #[serde(default)]
    pub connect_timeout: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            interface: String::new(),
            listen_addr: default_listen_addr(),
            listen_port: default_listen_port(),
            idle_timeout: default_idle_timeout(),
            verbose: false,
            handshake_timeout: None,
            connect_timeout: None,
        }
    }
}

impl ServerConfig {
    /// Relay inactivity timeout
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }

    /// Handshake timeout, if any
    pub fn handshake_timeout(&self) -> Option<Duration> {
        self.handshake_timeout.map(Duration::from_secs)
    }

    /// Connect timeout, if any
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_secs)
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let interface = &self.server.interface;
        if interface.is_empty() {
            return Err("An outbound interface is required".to_string());
        }
        if interface.len() > MAX_INTERFACE_NAME_LEN {
            return Err(format!(
                "Interface name too long: {} ({} bytes, max {})",
                interface,
                interface.len(),
                MAX_INTERFACE_NAME_LEN
            ));
        }
        if interface.as_bytes().contains(&0) {
            return Err("Interface name contains a NUL byte".to_string());
        }
        if self.server.idle_timeout == 0 {
            return Err("Idle timeout must be greater than zero".to_string());
        }
        if self.server.idle_timeout > MAX_TIMEOUT_SECS {
            return Err(format!(
                "Idle timeout too large: {} (max {} seconds)",
                self.server.idle_timeout, MAX_TIMEOUT_SECS
            ));
        }
        if self.server.handshake_timeout == Some(0) {
            return Err("Handshake timeout must be greater than zero".to_string());
        }
        if self.server.connect_timeout == Some(0) {
            return Err("Connect timeout must be greater than zero".to_string());
        }
        for (name, value) in [
            ("Handshake", self.server.handshake_timeout),
            ("Connect", self.server.connect_timeout),
        ] {
            if value.is_some_and(|secs| secs > MAX_TIMEOUT_SECS) {
                return Err(format!(
                    "{} timeout too large (max {} seconds)",
                    name, MAX_TIMEOUT_SECS
                ));
            }
        }
        Ok(())
    }
}
