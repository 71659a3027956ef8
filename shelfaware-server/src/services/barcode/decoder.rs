//! Barcode symbol decoding

use image::RgbImage;
use serde::Serialize;

/// A decoded barcode: symbology name and payload text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedSymbol {
    /// Symbology, e.g. `EAN13`, `CODE128`, `QRCODE`
    pub symbol_type: String,
    pub data: String,
}

/// Decodes every symbol visible in an image
pub trait SymbolDecoder: Send + Sync {
    /// All symbols found; empty when there are none
    fn decode(&self, image: &RgbImage) -> Vec<DecodedSymbol>;
}

/// Multi-format decoder backed by rxing
#[derive(Debug, Clone, Copy, Default)]
pub struct RxingDecoder;

impl SymbolDecoder for RxingDecoder {
    fn decode(&self, image: &RgbImage) -> Vec<DecodedSymbol> {
        let (width, height) = image.dimensions();
        let luma = image::imageops::grayscale(image).into_raw();

        match rxing::helpers::detect_multiple_in_luma(luma, width, height) {
            Ok(results) => results
                .iter()
                .map(|result| DecodedSymbol {
                    symbol_type: symbol_type_name(result.getBarcodeFormat()),
                    data: result.getText().to_string(),
                })
                .collect(),
            Err(e) => {
                tracing::debug!(width, height, error = ?e, "No barcode symbols decoded");
                Vec::new()
            }
        }
    }
}

/// Symbology name without separators (`EAN_13` becomes `EAN13`)
pub fn symbol_type_name(format: impl std::fmt::Debug) -> String {
    format!("{:?}", format).replace('_', "")
}
