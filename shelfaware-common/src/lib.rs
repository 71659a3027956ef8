//! # ShelfAware Common Library
//!
//! Shared code for the ShelfAware inventory service:
//! - Error taxonomy
//! - Inventory store schema and row models
//! - Timestamp and guid helpers

pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
