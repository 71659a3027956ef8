//! Open Food Facts product lookup client
//!
//! Translates a barcode into a [`FoodProduct`]. A "not found" answer from the
//! service is `Ok(None)`; transport failures are returned unwrapped and are
//! never retried.

use crate::db::ProductCache;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const OPENFOODS_BASE_URL: &str = "https://world.openfoodfacts.org/api/v0/product/";
const USER_AGENT: &str = concat!("ShelfAware/", env!("CARGO_PKG_VERSION"));
const LANGUAGE_TAG_PREFIX: &str = "en:";
const STATUS_FOUND: i64 = 1;

/// Product lookup errors
#[derive(Debug, Error)]
pub enum OpenFoodsError {
    /// Network or HTTP client failure, passed through as-is
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status other than 404
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Payload was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response cache read/write failure
    #[error("Cache error: {0}")]
    Cache(#[from] shelfaware_common::Error),
}

/// Normalized product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodProduct {
    pub product_name: Option<String>,
    /// Brand tags without the language prefix
    pub brands: Vec<String>,
    /// Category tags without the language prefix
    pub categories: Vec<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    product_name: Option<String>,
    #[serde(default)]
    brands_tags: Vec<String>,
    #[serde(default)]
    categories_tags: Vec<String>,
    image_front_url: Option<String>,
}

/// Open Food Facts API client
pub struct OpenFoodsClient {
    http_client: reqwest::Client,
    api_url: String,
    cache: Option<ProductCache>,
}

impl OpenFoodsClient {
    /// Create a client for the catalog rooted at `api_url`
    pub fn new(api_url: impl Into<String>) -> Result<Self, OpenFoodsError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        let mut api_url = api_url.into();
        if !api_url.ends_with('/') {
            api_url.push('/');
        }

        Ok(Self {
            http_client,
            api_url,
            cache: None,
        })
    }

    /// Serve repeated lookups from `cache`
    pub fn with_cache(mut self, cache: ProductCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn product_url(&self, barcode: &str) -> String {
        format!("{}{}.json", self.api_url, barcode)
    }

    /// Look up a product by barcode
    pub async fn fetch_product(&self, barcode: &str) -> Result<Option<FoodProduct>, OpenFoodsError> {
        if let Some(cache) = &self.cache {
            if let Some(payload) = cache.get(barcode).await? {
                tracing::debug!(barcode = %barcode, "Product lookup served from cache");
                return parse_product_payload(&payload);
            }
        }

        let url = self.product_url(barcode);
        tracing::debug!(barcode = %barcode, url = %url, "Querying Open Food Facts");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::info!(barcode = %barcode, "Product not found");
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenFoodsError::Api(status.as_u16(), error_text));
        }

        let payload = response.text().await?;
        let product = parse_product_payload(&payload)?;

        if let Some(cache) = &self.cache {
            cache.put(barcode, &payload).await?;
        }

        tracing::info!(
            barcode = %barcode,
            found = product.is_some(),
            "Open Food Facts lookup complete"
        );

        Ok(product)
    }

    /// Download the product's front image, if it has one
    pub async fn fetch_image(&self, product: &FoodProduct) -> Result<Option<Vec<u8>>, OpenFoodsError> {
        let Some(url) = product.image_url.as_deref() else {
            return Ok(None);
        };

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenFoodsError::Api(status.as_u16(), error_text));
        }

        let bytes = response.bytes().await?;
        tracing::debug!(url = %url, bytes = bytes.len(), "Product image downloaded");
        Ok(Some(bytes.to_vec()))
    }
}

/// Decode a catalog payload; `None` unless the status flag reports a match
pub fn parse_product_payload(payload: &str) -> Result<Option<FoodProduct>, OpenFoodsError> {
    let response: ProductResponse =
        serde_json::from_str(payload).map_err(|e| OpenFoodsError::Parse(e.to_string()))?;

    if response.status != STATUS_FOUND {
        return Ok(None);
    }

    let product = response
        .product
        .ok_or_else(|| OpenFoodsError::Parse("status 1 without product".to_string()))?;

    Ok(Some(FoodProduct {
        product_name: product.product_name,
        brands: product.brands_tags.iter().map(|t| strip_language_tag(t)).collect(),
        categories: product.categories_tags.iter().map(|t| strip_language_tag(t)).collect(),
        image_url: product.image_front_url,
    }))
}

/// Remove the `en:` language prefix from a taxonomy tag
pub fn strip_language_tag(tag: &str) -> String {
    tag.strip_prefix(LANGUAGE_TAG_PREFIX).unwrap_or(tag).to_string()
}
