//! shelfaware-server: household food inventory HTTP service

use anyhow::Result;
use clap::Parser;
use shelfaware_common::db::init_database;
use shelfaware_server::config::{Args, ServerConfig};
use shelfaware_server::db::ProductCache;
use shelfaware_server::inventory::InventoryManager;
use shelfaware_server::services::barcode::BarcodeRecognizer;
use shelfaware_server::services::OpenFoodsClient;
use shelfaware_server::{api, build_router, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting ShelfAware server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = ServerConfig::resolve(Args::parse())?;
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path).await?;
    let inventory = InventoryManager::new(pool.clone());

    let mut products = OpenFoodsClient::new(config.openfoods_url.clone())?;
    if config.product_cache {
        products = products.with_cache(ProductCache::new(pool.clone()));
        info!("Product lookup cache enabled");
    }

    let recognizer = BarcodeRecognizer::with_default_backends(config.confidence_threshold);
    info!(threshold = recognizer.confidence_threshold(), "Barcode recognizer ready");

    let state = AppState::new(inventory, Arc::new(products), Arc::new(recognizer));
    let app = build_router(state).layer(api::cors_layer(&config.frontend_url)?);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{} (frontend origin {})", addr, config.frontend_url);

    axum::serve(listener, app).await?;

    Ok(())
}
