//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single accept loop on the tokio runtime
//! - One task per connection, one request per connection
//! - Receive and response buffers borrowed from a shared [`RequestPool`]
//! - Requests routed through [`crate::router::Router`]

mod connection;
mod pool;
mod server;

pub use connection::{Connection, ConnectionSettings, ConnectionState};
pub use pool::{PooledRequest, RequestPool, RequestSlot};
pub use server::{Server, ShutdownHandle};
