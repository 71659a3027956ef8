//! Product lookup endpoint

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::{ApiError, ApiResult};
use crate::services::FoodProduct;
use crate::AppState;

/// GET /api/products/:barcode
pub async fn get_product(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<FoodProduct>> {
    if barcode.trim().is_empty() {
        return Err(ApiError::BadRequest("Barcode cannot be empty".to_string()));
    }

    state
        .products
        .fetch_product(&barcode)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {}", barcode)))
}

pub fn product_routes() -> Router<AppState> {
    Router::new().route("/api/products/:barcode", get(get_product))
}
