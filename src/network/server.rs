//! TCP Server
//!
//! Accepts connections and spawns one task per connection.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

use crate::config::Config;
use crate::error::Result;
use crate::router::Router;

use super::connection::{Connection, ConnectionSettings};
use super::pool::RequestPool;

/// HTTP server for wayfarer
pub struct Server {
    config: Config,
    router: Arc<Router>,
    pool: Arc<RequestPool>,
    settings: Arc<ConnectionSettings>,
    shutdown: Arc<Notify>,
}

/// Cloneable trigger that stops a running [`Server`]'s accept loop
#[derive(Clone)]
pub struct ShutdownHandle(Arc<Notify>);

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.0.notify_one();
    }
}

impl Server {
    /// Create a new server with the given config and router
    pub fn new(config: Config, router: Arc<Router>) -> Self {
        let pool = RequestPool::new(config.pool_size, config.buffer_size);
        let settings = Arc::new(ConnectionSettings::from_config(&config));

        Self {
            config,
            router,
            pool,
            settings,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> Result<()> {
        self.config.validate()?;
        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        tracing::info!("wayfarer listening on {}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.dispatch(stream, peer),
                    Err(e) => tracing::warn!("Accept failed: {}", e),
                }
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let router = Arc::clone(&self.router);
        let pool = Arc::clone(&self.pool);
        let settings = Arc::clone(&self.settings);

        tokio::spawn(async move {
            tracing::trace!("Accepted connection from {}", peer);
            let mut slot = pool.checkout();
            let connection = Connection::new(stream, peer);

            if let Err(e) = connection.handle(&router, &mut slot, &settings).await {
                tracing::debug!("Connection {} ended with error: {}", peer, e);
            }
        });
    }

    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Buffer pool shared by connection tasks
    pub fn pool(&self) -> &Arc<RequestPool> {
        &self.pool
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
