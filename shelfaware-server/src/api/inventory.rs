//! Inventory endpoints: users, lists, list items, categories, actions
//!
//! Thin JSON wrappers over [`InventoryManager`](crate::inventory::InventoryManager).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shelfaware_common::db::{Action, FoodItem, List, ListItem, User};

use crate::error::{ApiError, ApiResult};
use crate::inventory::NewFoodItem;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFoodRequest {
    pub name: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub name: String,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct CreateListItemRequest {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    pub category: String,
    #[serde(default)]
    pub food_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: f64,
}

/// Either `list_item_id` (exact entry) or `item_name` (earliest entry with
/// that name) identifies the item
#[derive(Debug, Deserialize)]
pub struct CreateActionRequest {
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub list_item_id: Option<String>,
    pub action_type: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
}

#[derive(Debug, Serialize)]
pub struct ListsResponse {
    pub lists: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ListItemsResponse {
    pub items: Vec<ListItem>,
}

#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub actions: Vec<Action>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.inventory.add_user(&req.username).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/users/:username/lists
pub async fn create_list(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<CreateListRequest>,
) -> ApiResult<(StatusCode, Json<List>)> {
    let list = state.inventory.add_list(&username, &req.name).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// GET /api/users/:username/lists
pub async fn get_lists(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ListsResponse>> {
    let lists = state.inventory.get_user_lists(&username).await?;
    Ok(Json(ListsResponse { lists }))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    state.inventory.add_category(&req.name).await?;
    Ok(Json(CategoryResponse { name: req.name }))
}

/// POST /api/foods
pub async fn create_food(
    State(state): State<AppState>,
    Json(req): Json<CreateFoodRequest>,
) -> ApiResult<(StatusCode, Json<FoodItem>)> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Food name cannot be empty".to_string()));
    }

    let food = state
        .inventory
        .add_food_item(NewFoodItem {
            name: req.name,
            barcode: req.barcode,
            image: None,
            description: req.description,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(food)))
}

/// POST /api/users/:username/lists/:list_name/items
pub async fn create_list_item(
    State(state): State<AppState>,
    Path((username, list_name)): Path<(String, String)>,
    Json(req): Json<CreateListItemRequest>,
) -> ApiResult<(StatusCode, Json<ListItem>)> {
    let item = state
        .inventory
        .add_list_item(
            &username,
            &list_name,
            &req.name,
            req.quantity,
            &req.category,
            req.food_name.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/users/:username/lists/:list_name/items
pub async fn get_list_items(
    State(state): State<AppState>,
    Path((username, list_name)): Path<(String, String)>,
) -> ApiResult<Json<ListItemsResponse>> {
    let items = state.inventory.get_list_entries(&username, &list_name).await?;
    Ok(Json(ListItemsResponse { items }))
}

/// PUT /api/lists/:list_name/items/:item_name/quantity
pub async fn update_quantity(
    State(state): State<AppState>,
    Path((list_name, item_name)): Path<(String, String)>,
    Json(req): Json<UpdateQuantityRequest>,
) -> ApiResult<Json<UpdatedResponse>> {
    let updated = state
        .inventory
        .update_quantity(&list_name, &item_name, req.quantity)
        .await?;
    Ok(Json(UpdatedResponse { updated }))
}

/// DELETE /api/lists/:list_name/items/:item_name
pub async fn remove_list_item(
    State(state): State<AppState>,
    Path((list_name, item_name)): Path<(String, String)>,
) -> ApiResult<Json<RemovedResponse>> {
    let removed = state.inventory.remove_list_item(&list_name, &item_name).await?;
    Ok(Json(RemovedResponse { removed }))
}

/// POST /api/users/:username/actions
pub async fn create_action(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<CreateActionRequest>,
) -> ApiResult<(StatusCode, Json<Action>)> {
    let inventory = &state.inventory;
    let action = match (req.list_item_id.as_deref(), req.item_name.as_deref()) {
        (Some(guid), _) => {
            inventory
                .add_entry_action(&username, guid, &req.action_type, req.quantity)
                .await?
        }
        (None, Some(item_name)) => {
            inventory
                .add_action(&username, item_name, &req.action_type, req.quantity)
                .await?
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "item_name or list_item_id is required".to_string(),
            ))
        }
    };
    Ok((StatusCode::CREATED, Json(action)))
}

/// GET /api/users/:username/actions
pub async fn get_actions(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<ActionsResponse>> {
    let actions = state.inventory.get_user_actions(&username).await?;
    Ok(Json(ActionsResponse { actions }))
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/users/:username/lists", get(get_lists).post(create_list))
        .route(
            "/api/users/:username/lists/:list_name/items",
            get(get_list_items).post(create_list_item),
        )
        .route("/api/users/:username/actions", get(get_actions).post(create_action))
        .route("/api/categories", post(create_category))
        .route("/api/foods", post(create_food))
        .route("/api/lists/:list_name/items/:item_name/quantity", put(update_quantity))
        .route("/api/lists/:list_name/items/:item_name", delete(remove_list_item))
}
