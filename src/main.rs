//! pinboard - social content-sharing backend

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pinboard::{
    config::Args,
    db::{MongoClient, Stores},
    server,
    social::spawn_reconcile_task,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pinboard={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  pinboard - content sharing backend");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Reconcile interval: {}s", args.reconcile_interval_secs);
    info!("======================================");

    // Connect to MongoDB; the document store is not optional here
    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    // Open collections and apply indexes, including the unique follow edge
    let stores = match Stores::init(&mongo).await {
        Ok(stores) => stores,
        Err(e) => {
            error!("Failed to initialize collections: {}", e);
            std::process::exit(1);
        }
    };
    info!("Collections initialized with indexes");

    // Periodic follower-counter reconciliation from the edge collection
    let _reconcile_handle = spawn_reconcile_task(
        stores.users.clone(),
        stores.follows.clone(),
        args.reconcile_interval_secs,
    );

    let state = Arc::new(server::AppState::new(args, stores));

    // Run the server
    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
