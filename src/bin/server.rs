//! Wayfarer Server Binary
//!
//! Loads the dataset and starts the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use wayfarer::engine::EngineConfig;
use wayfarer::loader::{self, Dataset};
use wayfarer::network::Server;
use wayfarer::{Config, Engine, Router};

/// Wayfarer Server
#[derive(Parser, Debug)]
#[command(name = "wayfarer-server")]
#[command(about = "In-memory travel records service")]
#[command(version)]
struct Args {
    /// Initial dataset: a directory or a .zip archive of the same files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:80")]
    listen: String,

    /// Reference timestamp for ages (unix seconds); overrides options.txt
    #[arg(long)]
    now: Option<i64>,

    /// Spare slots per entity table past the highest loaded id
    #[arg(long, default_value = "200000")]
    headroom: usize,

    /// Pooled request slots
    #[arg(short, long, default_value = "1024")]
    pool_size: usize,

    /// Receive buffer size per request in bytes
    #[arg(short, long, default_value = "4096")]
    buffer_size: usize,

    /// Runtime worker threads (0 = one per core)
    #[arg(short, long, default_value = "0")]
    workers: usize,

    /// Value of the Server response header
    #[arg(long, default_value = "wayfarer")]
    server_name: String,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wayfarer=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Wayfarer Server v{}", wayfarer::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let mut builder = Config::builder()
        .listen_addr(&args.listen)
        .table_headroom(args.headroom)
        .pool_size(args.pool_size)
        .buffer_size(args.buffer_size)
        .worker_threads(args.workers)
        .server_name(&args.server_name);
    if let Some(dir) = &args.data_dir {
        builder = builder.data_dir(dir);
    }
    if let Some(now) = args.now {
        builder = builder.now(now);
    }
    let config = builder.build();
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    // Load dataset before accepting any connection
    let engine = match open_engine(&config) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to load dataset: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let runtime = {
        let mut runtime = tokio::runtime::Builder::new_multi_thread();
        runtime.enable_all();
        if config.worker_threads > 0 {
            runtime.worker_threads(config.worker_threads);
        }
        match runtime.build() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Failed to start runtime: {}", e);
                std::process::exit(1);
            }
        }
    };

    let server = Server::new(config, Arc::new(Router::new(engine)));
    let shutdown = server.shutdown_handle();

    let outcome = runtime.block_on(async move {
        // Set up Ctrl+C handler
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
                shutdown.trigger();
            }
        });

        server.run().await
    });

    if let Err(e) = outcome {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

fn open_engine(config: &Config) -> wayfarer::Result<Engine> {
    match &config.data_dir {
        Some(dir) => {
            tracing::info!("Dataset: {}", dir.display());
            let dataset = loader::load(dir)?;
            let now = dataset.resolve_now(config.now);
            Engine::load(dataset, config.table_headroom, now)
        }
        None => {
            tracing::warn!("No data directory given, starting empty");
            let now = Dataset::default().resolve_now(config.now);
            Ok(Engine::new(EngineConfig::uniform(config.table_headroom, now)))
        }
    }
}
