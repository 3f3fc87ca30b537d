//! Server module for ifsocks
//!
//! This module owns the listening socket and hands each accepted
//! connection to its own SOCKS5 session task.

#[allow(clippy::module_inception)]
mod server;

pub use server::Server;

use crate::config::Config;
use anyhow::Result;
use tokio::sync::broadcast;

/// Bind the listener described by `config` and serve until shutdown
pub async fn run_server(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let server = Server::bind(&config).await?;
    server.run(shutdown_rx).await
}
