//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A named, user-owned collection of inventory entries
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct List {
    pub guid: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub guid: String,
    pub name: String,
}

/// Catalog entry, usually created from a product lookup
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FoodItem {
    pub guid: String,
    pub name: String,
    pub barcode: Option<String>,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub image: Option<Vec<u8>>,
    pub description: Option<String>,
}

/// One entry within a list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListItem {
    pub guid: String,
    pub name: String,
    pub quantity: f64,
    pub date_added: DateTime<Utc>,
    /// `None` while the entry is active
    pub date_removed: Option<DateTime<Utc>>,
    pub list_id: String,
    pub category_id: String,
    pub food_id: Option<String>,
}

impl ListItem {
    pub fn is_active(&self) -> bool {
        self.date_removed.is_none()
    }
}

/// A logged purchase/consume/remove event
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Action {
    pub guid: String,
    pub action_type: String,
    pub quantity: f64,
    pub date: DateTime<Utc>,
    pub user_id: String,
    pub list_item_id: Option<String>,
}
