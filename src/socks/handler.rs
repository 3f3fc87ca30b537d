//! Per-connection SOCKS5 session
//!
//! This module provides the entry point for one accepted client
//! connection. It runs negotiation, request parsing, resolution, the
//! interface-bound connect and the relay, and decides at each stage
//! whether the client is still owed a reply.

use crate::config::Config;
use crate::error::ProxyError;
use crate::socks::auth::negotiate;
use crate::socks::command::{parse_command, send_general_failure, send_reply, Reply};
use crate::socks::tcp_relay::Relay;
use crate::socks::types::ConnectRequest;
use crate::transport::{connect_bound, resolve_target, SocketOpts};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Settings one session needs, shared read-only by all sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Device outbound connections are bound to
    pub interface: String,
    /// Relay inactivity timeout
    pub idle_timeout: Duration,
    /// Log lifecycle events at info level
    pub verbose: bool,
    /// Bound on each handshake read stage
    pub handshake_timeout: Option<Duration>,
    /// Bound on the outbound connect
    pub connect_timeout: Option<Duration>,
    /// Options applied to outbound sockets
    pub socket_opts: SocketOpts,
}

impl SessionConfig {
    /// Session settings with unbounded handshake and connect
    pub fn new(interface: impl Into<String>, idle_timeout: Duration) -> Self {
        SessionConfig {
            interface: interface.into(),
            idle_timeout,
            verbose: false,
            handshake_timeout: None,
            connect_timeout: None,
            socket_opts: SocketOpts::default(),
        }
    }

    /// Derive session settings from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        SessionConfig {
            interface: config.server.interface.clone(),
            idle_timeout: config.server.idle_timeout(),
            verbose: config.server.verbose,
            handshake_timeout: config.server.handshake_timeout(),
            connect_timeout: config.server.connect_timeout(),
            socket_opts: SocketOpts::from_tcp_config(&config.tcp),
        }
    }
}

/// Handle one client connection to completion
///
/// # Protocol Flow
///
/// 1. Method negotiation (no reply on a malformed greeting)
/// 2. CONNECT request parsing
/// 3. Resolution and interface-bound connect
/// 4. Success reply with the client-facing local endpoint
/// 5. Relay until EOF, error, or idle timeout
///
/// Failures in steps 2 and 3 are answered with a general failure reply.
/// `Ok(())` means the relay ended because one side closed.
pub async fn handle_client(mut client: TcpStream, config: &SessionConfig) -> Result<(), ProxyError> {
    let peer = client.peer_addr().ok();

    bounded(config.handshake_timeout, negotiate(&mut client)).await?;

    let request = match bounded(config.handshake_timeout, parse_command(&mut client)).await {
        Ok(request) => request,
        Err(e) => {
            send_general_failure(&mut client).await;
            return Err(e);
        }
    };

    debug!(
        "Client {} requested {} (atyp {:#04x})",
        display_peer(peer),
        request.target,
        request.target.addr_type()
    );

    let (remote, target) = match connect_target(&request, peer, config).await {
        Ok(connected) => connected,
        Err(e) => {
            send_general_failure(&mut client).await;
            return Err(e);
        }
    };

    let local = match client.local_addr() {
        Ok(local) => local,
        Err(e) => {
            send_general_failure(&mut client).await;
            return Err(e.into());
        }
    };
    send_reply(&mut client, &Reply::success_from(local)).await?;

    if config.verbose {
        info!("Client {} successfully connected to {}", display_peer(peer), target);
    }

    let stats = Relay::new(client, remote, config.idle_timeout).run().await?;

    debug!(
        "Session {} -> {} finished by {}: {} bytes up, {} bytes down",
        display_peer(peer),
        target,
        stats.closed_by,
        stats.client_to_remote,
        stats.remote_to_client
    );

    Ok(())
}

/// Resolve the request target and open the bound outbound connection
async fn connect_target(
    request: &ConnectRequest,
    peer: Option<SocketAddr>,
    config: &SessionConfig,
) -> Result<(TcpStream, SocketAddr), ProxyError> {
    let addr = resolve_target(&request.target).await?;

    if config.verbose {
        info!(
            "Client {} is trying to connect to {} ({})",
            display_peer(peer),
            request.target,
            addr
        );
    }

    let remote = connect_bound(
        addr,
        &config.interface,
        &config.socket_opts,
        config.connect_timeout,
    )
    .await?;

    Ok((remote, SocketAddr::V4(addr)))
}

/// Run a handshake stage, bounded when a limit is configured
async fn bounded<T, F>(limit: Option<Duration>, stage: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, ProxyError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, stage)
            .await
            .map_err(|_| ProxyError::HandshakeTimeout(limit))?,
        None => stage.await,
    }
}

fn display_peer(peer: Option<SocketAddr>) -> String {
    peer.map(|p| p.to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}
