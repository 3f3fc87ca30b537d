//! Test utilities and mocks for ifsocks
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use ifsocks::config::{Config, ServerConfig};
use ifsocks::server::Server;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Create a connected TCP stream pair for testing
pub async fn create_tcp_stream_pair() -> (TcpStream, TcpStream) {
    let (listener, addr) = create_test_listener().await;

    let connect_fut = TcpStream::connect(addr);
    let accept_fut = listener.accept();

    let (client_stream, accept_result) = tokio::join!(connect_fut, accept_fut);
    let (server_stream, _) = accept_result.unwrap();

    (client_stream.unwrap(), server_stream)
}

/// Test configuration builder
pub struct TestConfigBuilder {
    interface: String,
    idle_timeout: u64,
    verbose: bool,
    handshake_timeout: Option<u64>,
    connect_timeout: Option<u64>,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            interface: "lo".to_string(),
            idle_timeout: 60,
            verbose: false,
            handshake_timeout: None,
            connect_timeout: None,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outbound interface
    pub fn interface(mut self, interface: &str) -> Self {
        self.interface = interface.to_string();
        self
    }

    /// Set the idle timeout in seconds
    pub fn idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout = secs;
        self
    }

    /// Enable lifecycle logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the handshake timeout in seconds
    pub fn handshake_timeout(mut self, secs: u64) -> Self {
        self.handshake_timeout = Some(secs);
        self
    }

    /// Set the connect timeout in seconds
    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout = Some(secs);
        self
    }

    /// Build the configuration, listening on an ephemeral loopback port
    pub fn build(self) -> Config {
        Config {
            server: ServerConfig {
                interface: self.interface,
                listen_addr: Ipv4Addr::LOCALHOST,
                listen_port: 0,
                idle_timeout: self.idle_timeout,
                verbose: self.verbose,
                handshake_timeout: self.handshake_timeout,
                connect_timeout: self.connect_timeout,
            },
            ..Default::default()
        }
    }
}

/// A running server and the handle that stops it
pub struct TestServer {
    /// Address clients connect to
    pub addr: SocketAddr,
    shutdown_tx: broadcast::Sender<bool>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    /// Bind and start a server for `config`
    pub async fn start(config: Config) -> Self {
        let server = Server::bind(&config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(server.run(shutdown_rx));
        TestServer {
            addr,
            shutdown_tx,
            handle,
        }
    }

    /// Open a client connection to the server
    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }

    /// Whether the accept loop is still running
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the accept loop and wait for it
    pub async fn stop(self) {
        self.shutdown_tx.send(true).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

/// Mock SOCKS5 handshake data
pub mod socks5_mock {
    use ifsocks::socks::*;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a method selection request offering only username/password
    pub fn create_auth_request_password() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, 0x02]
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
        ];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        cmd.extend_from_slice(domain.as_bytes());
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_listener() {
        let (listener, addr) = create_test_listener().await;
        assert!(addr.port() > 0);
        drop(listener);
    }

    #[test]
    fn test_config_builder() {
        let config = TestConfigBuilder::new()
            .interface("tun0")
            .idle_timeout(5)
            .verbose(true)
            .connect_timeout(2)
            .build();

        assert_eq!(config.server.interface, "tun0");
        assert_eq!(config.server.idle_timeout, 5);
        assert!(config.server.verbose);
        assert_eq!(config.server.handshake_timeout, None);
        assert_eq!(config.server.connect_timeout, Some(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socks5_mock_auth_request() {
        let request = socks5_mock::create_auth_request_no_auth();
        assert_eq!(request[0], 5); // SOCKS5 version
        assert_eq!(request[1], 1); // 1 method
        assert_eq!(request[2], 0); // NO AUTH
    }

    #[test]
    fn test_socks5_mock_connect_domain() {
        let cmd = socks5_mock::create_connect_domain("example.com", 443);
        assert_eq!(cmd[3], 3); // DOMAIN
        assert_eq!(cmd[4], 11);
        assert_eq!(&cmd[5..16], b"example.com");
        assert_eq!(&cmd[16..], &[0x01, 0xBB]);
    }
}
