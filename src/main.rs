//! ifsocks - Interface-Bound SOCKS5 Proxy
//!
//! This is the main entry point for the ifsocks application.

use anyhow::{bail, Result};
use clap::Parser;
use ifsocks::config::{load_config, Config};
use ifsocks::server::run_server;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// ifsocks - SOCKS5 proxy that binds outbound connections to one interface
#[derive(Parser, Debug)]
#[command(name = "ifsocks")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Network interface for outbound connections (e.g. tun0)
    #[arg(short, long)]
    interface: Option<String>,

    /// Address to listen on [default: 127.0.0.1]
    #[arg(short, long)]
    listen: Option<Ipv4Addr>,

    /// Port to listen on [default: 1080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Idle timeout in seconds [default: 60]
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Log connection lifecycle events
    #[arg(short, long)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_log: bool,

    /// Handshake read timeout in seconds
    #[arg(long)]
    handshake_timeout: Option<u64>,

    /// Outbound connect timeout in seconds
    #[arg(long)]
    connect_timeout: Option<u64>,
}

impl Args {
    /// Layer command-line values over the file configuration
    fn apply(&self, config: &mut Config) {
        if let Some(interface) = &self.interface {
            config.server.interface = interface.clone();
        }
        if let Some(listen) = self.listen {
            config.server.listen_addr = listen;
        }
        if let Some(port) = self.port {
            config.server.listen_port = port;
        }
        if let Some(timeout) = self.timeout {
            config.server.idle_timeout = timeout;
        }
        if self.verbose {
            config.server.verbose = true;
        }
        if self.handshake_timeout.is_some() {
            config.server.handshake_timeout = self.handshake_timeout;
        }
        if self.connect_timeout.is_some() {
            config.server.connect_timeout = self.connect_timeout;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);

    // Setup logging
    let default_level = if config.server.verbose { "debug" } else { "info" };
    setup_logging(
        args.log_level.as_deref().unwrap_or(default_level),
        args.json_log,
    )?;

    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {}", e);
    }

    info!("ifsocks v{}", ifsocks::VERSION);
    if let Some(path) = &args.config {
        info!("Configuration loaded from: {:?}", path);
    }

    // Setup shutdown signal
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // Handle Ctrl+C and termination signals (cross-platform)
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {
                            info!("Received Ctrl+C, shutting down...");
                        }
                        _ = sigterm.recv() => {
                            info!("Received SIGTERM, shutting down...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to setup SIGTERM handler: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Received Ctrl+C, shutting down...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
        }

        let _ = shutdown_tx_clone.send(true);
    });

    run_server(config, shutdown_rx).await
}

/// Setup logging based on configuration
fn setup_logging(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
