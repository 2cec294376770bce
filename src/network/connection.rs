//! Connection Handler
//!
//! Drives one accepted socket through a single request/response exchange.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::Config;
use crate::error::{Result, WayfarerError};
use crate::protocol::Response;
use crate::router::Router;

use super::pool::RequestSlot;

/// Per-connection settings shared by every connection task
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub server_name: String,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl ConnectionSettings {
    pub fn from_config(config: &Config) -> Self {
        fn timeout(ms: u64) -> Option<Duration> {
            (ms > 0).then(|| Duration::from_millis(ms))
        }

        Self {
            server_name: config.server_name.clone(),
            read_timeout: timeout(config.read_timeout_ms),
            write_timeout: timeout(config.write_timeout_ms),
        }
    }
}

/// Pipeline stage of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Accepted,
    Receiving,
    Processing,
    Sending,
    Closed,
}

/// Handles a single client connection
pub struct Connection {
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: SocketAddr,

    state: ConnectionState,
}

impl Connection {
    /// Wrap an accepted stream
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        // Disable Nagle's algorithm for low latency
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
        }

        Self {
            stream,
            peer_addr,
            state: ConnectionState::Accepted,
        }
    }

    /// Serve exactly one request, then close the socket
    ///
    /// The socket is shut down whether or not the exchange succeeded.
    pub async fn handle(
        mut self,
        router: &Router,
        slot: &mut RequestSlot,
        settings: &ConnectionSettings,
    ) -> Result<()> {
        let result = self.exchange(router, slot, settings).await;
        self.close().await;
        result
    }

    async fn exchange(
        &mut self,
        router: &Router,
        slot: &mut RequestSlot,
        settings: &ConnectionSettings,
    ) -> Result<()> {
        let (buffer, response) = slot.split();

        self.transition(ConnectionState::Receiving);
        let received = with_timeout(settings.read_timeout, self.stream.read(buffer)).await?;
        if received == 0 {
            tracing::debug!("Client {} closed without sending a request", self.peer_addr);
            return Ok(());
        }

        self.transition(ConnectionState::Processing);
        let request = &buffer[..received];
        let reply = catch_unwind(AssertUnwindSafe(|| router.handle(request))).unwrap_or_else(|_| {
            tracing::warn!("Request handling panicked for {}", self.peer_addr);
            Response::bad_request()
        });
        reply.encode_into(response, &settings.server_name);

        self.transition(ConnectionState::Sending);
        with_timeout(settings.write_timeout, self.stream.write_all(response)).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!("Shutdown of {} failed: {}", self.peer_addr, e);
        }
        self.transition(ConnectionState::Closed);
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::trace!(peer = %self.peer_addr, from = ?self.state, to = ?next, "Connection state");
        self.state = next;
    }
}

async fn with_timeout<T>(
    limit: Option<Duration>,
    operation: impl Future<Output = io::Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(WayfarerError::Io(io::Error::from(io::ErrorKind::TimedOut))),
        },
        None => Ok(operation.await?),
    }
}
