//! Inventory management over the shared store
//!
//! Users own lists, lists hold items, items are logged through actions.

pub mod manager;

pub use manager::{InventoryManager, NewFoodItem, PurchaseRecord};
