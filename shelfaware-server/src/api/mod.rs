//! HTTP API handlers for shelfaware-server

pub mod health;
pub mod inventory;
pub mod items;
pub mod products;
pub mod scan;

pub use health::health_routes;
pub use inventory::inventory_routes;
pub use items::item_routes;
pub use products::product_routes;
pub use scan::scan_routes;

use axum::http::HeaderValue;
use shelfaware_common::{Error, Result};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

/// CORS policy admitting only the frontend origin, with credentials
///
/// Methods and headers are mirrored from the preflight because wildcards
/// are rejected when credentials are allowed.
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(frontend_url)
        .map_err(|e| Error::Config(format!("Invalid frontend origin {:?}: {}", frontend_url, e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
