//! Service layer: barcode recognition, product lookup, scan workflow

pub mod barcode;
pub mod openfoods_client;
pub mod shelf_scanner;

pub use openfoods_client::{FoodProduct, OpenFoodsClient, OpenFoodsError};
pub use shelf_scanner::{ScanError, ScanOutcome, ShelfScanner};
