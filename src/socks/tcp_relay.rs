//! TCP relay for established CONNECT sessions
//!
//! A single loop waits for either socket to become readable, moves one
//! chunk through a shared buffer to the other socket, and repeats. The
//! session ends as soon as either side reaches EOF or fails; there is no
//! half-close, and a window with no traffic at all ends it with an error.

use crate::error::ProxyError;
use crate::socks::consts::RELAY_BUFFER_SIZE;
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::debug;

/// One end of a relayed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The SOCKS client
    Client,
    /// The target host
    Remote,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Client => write!(f, "client"),
            Side::Remote => write!(f, "remote"),
        }
    }
}

/// Totals of a relay that ended with an orderly shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    /// Bytes forwarded from the client to the remote
    pub client_to_remote: u64,
    /// Bytes forwarded from the remote to the client
    pub remote_to_client: u64,
    /// Side whose EOF ended the session
    pub closed_by: Side,
}

/// Bidirectional relay between a client and its remote
///
/// Owns both sockets; they are closed when the relay is dropped, which
/// happens on every way out of [`Relay::run`].
pub struct Relay {
    client: TcpStream,
    remote: TcpStream,
    idle_timeout: Duration,
    buf: Box<[u8]>,
}

impl Relay {
    /// Create a relay with a fresh buffer
    pub fn new(client: TcpStream, remote: TcpStream, idle_timeout: Duration) -> Self {
        Relay {
            client,
            remote,
            idle_timeout,
            buf: vec![0u8; RELAY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Pump bytes until EOF, error, or idle timeout
    pub async fn run(mut self) -> Result<RelayStats, ProxyError> {
        let mut client_to_remote = 0u64;
        let mut remote_to_client = 0u64;
        let mut deadline = idle_deadline(self.idle_timeout);

        loop {
            // Retries keep the deadline; only forwarded data pushes it out
            let ready = time::timeout_at(deadline, wait_readable(&self.client, &self.remote))
                .await
                .map_err(|_| ProxyError::IdleTimeout(self.idle_timeout))?;

            let side = match ready {
                Ok(side) => side,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            let (src, dst) = match side {
                Side::Client => (&self.client, &mut self.remote),
                Side::Remote => (&self.remote, &mut self.client),
            };

            let n = match src.try_read(&mut self.buf) {
                Ok(0) => {
                    debug!("{} closed the connection", side);
                    return Ok(RelayStats {
                        client_to_remote,
                        remote_to_client,
                        closed_by: side,
                    });
                }
                Ok(n) => n,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            };

            write_chunk(dst, &self.buf[..n]).await?;

            match side {
                Side::Client => client_to_remote += n as u64,
                Side::Remote => remote_to_client += n as u64,
            }
            deadline = idle_deadline(self.idle_timeout);
        }
    }
}

/// Deadline one idle window from now
///
/// Windows too long to represent end at a far-future instant instead.
fn idle_deadline(idle_timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(idle_timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}

/// Wait until either socket has something to read (data, EOF, or error)
async fn wait_readable(client: &TcpStream, remote: &TcpStream) -> io::Result<Side> {
    tokio::select! {
        ready = client.readable() => ready.map(|_| Side::Client),
        ready = remote.readable() => ready.map(|_| Side::Remote),
    }
}

/// Write the whole chunk, looping over partial writes
async fn write_chunk(dst: &mut TcpStream, chunk: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < chunk.len() {
        match dst.write(&chunk[written..]).await {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
