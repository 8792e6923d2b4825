//! REST API server for the in-memory entity store.
//!
//! Loads an entity model (schema file or built-in demo model), builds the
//! registry, and serves the entity API with graceful shutdown.

mod model;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use entity_model::EntityModel;
use entity_rest::{router::Router, server::Server};
use entity_store::{Registry, StoreConfig};
use tokio::signal;
use tracing::info;

/// Command-line arguments for the entity server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Entity model schema file (JSON); built-in demo model if omitted
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Request body read timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Default page size for list responses
    #[arg(long, default_value_t = 20)]
    default_page_size: usize,

    /// Maximum page size for list responses
    #[arg(long, default_value_t = 1000)]
    max_page_size: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    let config = Arc::new(StoreConfig {
        request_timeout_ms: args.request_timeout_ms,
        default_page_size: args.default_page_size,
        max_page_size: args.max_page_size,
        ..StoreConfig::default()
    });

    // Load entity model
    let entity_model = match &args.schema {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read schema file {:?}: {}", path, e))?;
            let entity_model: EntityModel = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("Failed to parse schema file {:?}: {}", path, e))?;
            info!("Loaded entity model from {:?}", path);
            entity_model
        }
        None => {
            info!("Using built-in demo entity model");
            model::default_model()
        }
    };

    // Build registry; model validation failures are fatal
    let registry = Registry::from_model(entity_model, (*config).clone())
        .map_err(|e| anyhow::anyhow!("Invalid entity model: {}", e))?;
    let registry = Arc::new(registry);

    for schema in registry.schemas() {
        info!(
            "Serving entity type {} at /api/{}",
            schema.name, schema.resource
        );
    }

    // Create router and server
    let router = Router::new(registry, config);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let server = Server::new(addr, router);

    info!("Starting entity server on {}:{}", args.host, args.port);

    // Start server with graceful shutdown
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for Ctrl+C
    signal::ctrl_c().await?;
    info!("Shutting down server");
    server_handle.abort();

    Ok(())
}
