//! shelfaware-server library
//!
//! Household food inventory service: users keep named lists of food items,
//! and a shelf photo can be turned into a list entry by decoding its barcode
//! and looking the product up in Open Food Facts.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod services;

use inventory::InventoryManager;
use services::barcode::BarcodeRecognizer;
use services::{OpenFoodsClient, ShelfScanner};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryManager,
    pub products: Arc<OpenFoodsClient>,
    pub scanner: ShelfScanner,
}

impl AppState {
    pub fn new(
        inventory: InventoryManager,
        products: Arc<OpenFoodsClient>,
        recognizer: Arc<BarcodeRecognizer>,
    ) -> Self {
        let scanner = ShelfScanner::new(recognizer, products.clone(), inventory.clone());
        Self { inventory, products, scanner }
    }
}

/// Build application router
///
/// CORS is applied by the caller (see [`api::cors_layer`]) so tests can
/// exercise handlers without an origin.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::item_routes())
        .merge(api::inventory_routes())
        .merge(api::product_routes())
        .merge(api::scan_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
