//! # Wayfarer
//!
//! An in-memory travel records service with:
//! - Accounts, places and visits held in fixed-capacity entity tables
//! - Per-owner visit lists kept sorted by timestamp for range scans
//! - Per-entity locking with a global lock order for multi-entity writes
//! - A minimal HTTP/1.1 front end, one request per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (tokio, one task per connection)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  raw request bytes (pooled buffers)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Request Router                             │
//! │        (parse, validate, dispatch, frame response)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        (per-entity RwLock, sorted visit indexes)             │
//! └──────┬──────────────────────┬──────────────────────┬────────┘
//!        ▼                      ▼                      ▼
//!  ┌───────────┐          ┌───────────┐          ┌───────────┐
//!  │ Accounts  │          │  Places   │          │  Visits   │
//!  │  (table)  │          │  (table)  │          │  (table)  │
//!  └───────────┘          └───────────┘          └───────────┘
//!        ▲                      ▲                      ▲
//!        └──────────── Loader (startup dataset) ───────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod table;
pub mod engine;
pub mod loader;
pub mod protocol;
pub mod router;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, WayfarerError};
pub use config::Config;
pub use engine::Engine;
pub use router::Router;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Wayfarer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
