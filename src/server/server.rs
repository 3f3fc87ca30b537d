//! Listener and accept loop
//!
//! Manages the listening socket and the lifetime of the accept loop.

use crate::config::Config;
use crate::socks::{handle_client, SessionConfig};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept before trying again
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Main ifsocks server
pub struct Server {
    /// Listening socket
    listener: TcpListener,
    /// Settings shared by every session
    session: Arc<SessionConfig>,
}

impl Server {
    /// Bind the listening socket
    ///
    /// Failing to bind is fatal: nothing has been served yet and there is
    /// nothing to fall back to.
    pub async fn bind(config: &Config) -> Result<Self> {
        let addr = SocketAddr::from((config.server.listen_addr, config.server.listen_port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to listen on {}", addr))?;

        Ok(Server {
            listener,
            session: Arc::new(SessionConfig::from_config(config)),
        })
    }

    /// Address the listener is actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Session settings handed to every connection
    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    /// Accept connections until shutdown
    ///
    /// Each connection runs in its own task; one session failing never
    /// affects the listener or other sessions.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        info!("Listening on {}", self.local_addr()?);
        info!("Outbound interface: {}", self.session.interface);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            accept_failed(&e).await;
                            continue;
                        }
                    };

                    if self.session.verbose {
                        info!("Client connected from {}", peer);
                    } else {
                        debug!("Client connected from {}", peer);
                    }

                    let session = self.session.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, &session).await {
                            warn!("Session with {} ended: {:#}", peer, e);
                        }
                    });
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Log an accept error and back off before the next attempt
async fn accept_failed(e: &std::io::Error) {
    error!("Failed to accept connection: {}", e);
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}
