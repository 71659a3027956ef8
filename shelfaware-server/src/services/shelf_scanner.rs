//! Scan workflow: photo in, list entry and purchase action out
//!
//! recognize → catalog lookup → record purchase. The purchase (food item,
//! category, list entry, action) is written in a single transaction.

use crate::inventory::{InventoryManager, NewFoodItem, PurchaseRecord};
use crate::services::barcode::{BarcodeRecognizer, DecodedSymbol, ImageInput, RecognitionError};
use crate::services::openfoods_client::{FoodProduct, OpenFoodsClient, OpenFoodsError};
use serde::Serialize;
use shelfaware_common::db::{Action, FoodItem, ListItem};
use shelfaware_common::Error;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Category used when neither the caller nor the catalog provides one
pub const DEFAULT_CATEGORY: &str = "uncategorized";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("Product lookup failed: {0}")]
    Lookup(#[from] OpenFoodsError),

    #[error(transparent)]
    Inventory(#[from] Error),

    #[error("Recognition task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Everything a successful scan created or resolved
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub symbol: DecodedSymbol,
    pub product: FoodProduct,
    pub food_item: FoodItem,
    pub list_item: ListItem,
    pub action: Action,
}

#[derive(Clone)]
pub struct ShelfScanner {
    recognizer: Arc<BarcodeRecognizer>,
    products: Arc<OpenFoodsClient>,
    inventory: InventoryManager,
}

impl ShelfScanner {
    pub fn new(
        recognizer: Arc<BarcodeRecognizer>,
        products: Arc<OpenFoodsClient>,
        inventory: InventoryManager,
    ) -> Self {
        Self { recognizer, products, inventory }
    }

    /// Add the product pictured in `input` to the user's list
    ///
    /// Returns `Ok(None)` when no barcode is decoded or the catalog knows
    /// none of the decoded values. The list is checked before any write.
    pub async fn scan_into_list(
        &self,
        input: ImageInput,
        username: &str,
        list_name: &str,
        category: Option<&str>,
    ) -> Result<Option<ScanOutcome>, ScanError> {
        let lists = self.inventory.get_user_lists(username).await?;
        if !lists.iter().any(|name| name == list_name) {
            return Err(Error::NotFound(format!(
                "List {} not found for user {}",
                list_name, username
            ))
            .into());
        }

        let recognizer = Arc::clone(&self.recognizer);
        let symbols = tokio::task::spawn_blocking(move || recognizer.recognize(input)).await??;

        let Some((symbol, product)) = self.first_known_product(symbols).await? else {
            info!(username = %username, list = %list_name, "Scan found no known product");
            return Ok(None);
        };

        let food = self.new_food_for(&symbol.data, &product).await?;

        let category = category
            .map(str::to_string)
            .or_else(|| product.categories.first().cloned())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let PurchaseRecord { food_item, list_item, action } = self
            .inventory
            .add_purchase(username, list_name, food, &category, 1.0)
            .await?;

        info!(
            username = %username,
            list = %list_name,
            barcode = %symbol.data,
            item = %list_item.name,
            "Scanned product added to list"
        );

        Ok(Some(ScanOutcome { symbol, product, food_item, list_item, action }))
    }

    async fn first_known_product(
        &self,
        symbols: Vec<DecodedSymbol>,
    ) -> Result<Option<(DecodedSymbol, FoodProduct)>, ScanError> {
        for symbol in symbols {
            if let Some(product) = self.products.fetch_product(&symbol.data).await? {
                return Ok(Some((symbol, product)));
            }
        }
        Ok(None)
    }

    /// Catalog entry for `barcode`; the image is only fetched for new products
    async fn new_food_for(
        &self,
        barcode: &str,
        product: &FoodProduct,
    ) -> Result<NewFoodItem, ScanError> {
        let known = self.inventory.find_food_item_by_barcode(barcode).await?.is_some();

        // The image is a nicety; a failed download does not abort the scan
        let image = if known {
            None
        } else {
            match self.products.fetch_image(product).await {
                Ok(image) => image,
                Err(e) => {
                    warn!(barcode = %barcode, error = %e, "Product image download failed");
                    None
                }
            }
        };

        let description = (!product.brands.is_empty()).then(|| product.brands.join(", "));
        Ok(NewFoodItem {
            name: product
                .product_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| barcode.to_string()),
            barcode: Some(barcode.to_string()),
            image,
            description,
        })
    }
}
