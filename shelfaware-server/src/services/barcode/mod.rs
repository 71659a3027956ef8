//! Barcode recognition pipeline
//!
//! `locate` normalizes an [`ImageInput`] to RGB and asks a [`BarcodeDetector`]
//! where barcodes are; `decode` runs a [`SymbolDecoder`] over the candidate
//! regions; `recognize` composes the two.

pub mod decoder;
pub mod detector;
pub mod input;
pub mod recognizer;

pub use decoder::{DecodedSymbol, RxingDecoder, SymbolDecoder};
pub use detector::{BarcodeDetector, BoundingBox, Detection, FullFrameDetector};
pub use input::{ChannelOrder, ImageInput, PixelBuffer};
pub use recognizer::{BarcodeRecognizer, RegionStrategy, DEFAULT_CONFIDENCE_THRESHOLD};

use thiserror::Error;

/// Recognition pipeline errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Input that cannot be interpreted as an image
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image could not be read or decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Detector backend failure
    #[error("Detector error: {0}")]
    Detector(String),
}
