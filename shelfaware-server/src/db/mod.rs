//! Service-specific database access
//!
//! The inventory tables are created by `shelfaware_common::db::init`.

pub mod product_cache;

pub use product_cache::ProductCache;
