//! Placeholder item endpoints
//!
//! These predate the persistent inventory routes and return fixed data. They
//! never touch the store.

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /items
pub async fn list_items() -> Json<Vec<Item>> {
    Json(vec![
        Item { name: "Apple".to_string(), quantity: 10 },
        Item { name: "Banana".to_string(), quantity: 5 },
    ])
}

/// POST /items
pub async fn add_item(Json(item): Json<Item>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("Item {} added with quantity {}", item.name, item.quantity),
    })
}

pub fn item_routes() -> Router<AppState> {
    Router::new().route("/items", get(list_items).post(add_item))
}
