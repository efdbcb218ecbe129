//! cinevault Server Binary
//!
//! Starts the TCP server for cinevault.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cinevault::network::Server;
use cinevault::{Config, MovieStore};

/// cinevault Server
#[derive(Parser, Debug)]
#[command(name = "cinevault-server")]
#[command(about = "Concurrent movie-record server with flat-file persistence")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    listen: String,

    /// Durable catalog file
    #[arg(short, long, default_value = "./movies.csv")]
    data_file: String,

    /// Maximum concurrent sessions
    #[arg(short = 'c', long, default_value = "64")]
    max_connections: usize,

    /// Maximum number of movies in the catalog
    #[arg(short = 'r', long, default_value = "1000")]
    max_records: usize,

    /// Session read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cinevault=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("cinevault Server v{}", cinevault::VERSION);
    tracing::info!("Data file: {}", args.data_file);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_file(&args.data_file)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_records(args.max_records)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    // Load the catalog
    let store = match MovieStore::open(&config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            tracing::error!("Failed to open catalog: {}", e);
            std::process::exit(1);
        }
    };

    // Start server
    let mut server = match Server::bind(config, store) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind listener: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
