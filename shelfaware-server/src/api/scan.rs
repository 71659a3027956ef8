//! Shelf photo scan endpoint
//!
//! The request body is the encoded image (JPEG, PNG, ...). A recognized
//! product is added to the list with quantity 1 and a purchase action.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::barcode::ImageInput;
use crate::services::ScanOutcome;
use crate::AppState;

/// Camera photos routinely exceed axum's 2 MiB default
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ScanOutcome>,
}

/// POST /api/users/:username/lists/:list_name/scan
pub async fn scan_image(
    State(state): State<AppState>,
    Path((username, list_name)): Path<(String, String)>,
    Query(query): Query<ScanQuery>,
    body: Bytes,
) -> ApiResult<Json<ScanResponse>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Image body is empty".to_string()));
    }

    let outcome = state
        .scanner
        .scan_into_list(
            ImageInput::Encoded(body.to_vec()),
            &username,
            &list_name,
            query.category.as_deref(),
        )
        .await?;

    Ok(Json(ScanResponse { found: outcome.is_some(), outcome }))
}

pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:username/lists/:list_name/scan", post(scan_image))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
}
