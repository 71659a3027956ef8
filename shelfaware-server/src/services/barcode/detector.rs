//! Barcode region detection
//!
//! A pretrained object detector plugs in behind [`BarcodeDetector`].

use super::RecognitionError;
use image::RgbImage;

/// Pixel-space box, `x2`/`y2` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn full_frame(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self { x1: 0, y1: 0, x2: width, y2: height }
    }

    /// Clamp to `width`x`height`; `None` when nothing of the box remains
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        let x1 = self.x1.min(width);
        let y1 = self.y1.min(height);
        let x2 = self.x2.min(width);
        let y2 = self.y2.min(height);

        (x2 > x1 && y2 > y1).then_some(Self { x1, y1, x2, y2 })
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

/// One detected barcode region
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// Detector confidence, 0.0 to 1.0
    pub confidence: f32,
}

/// Locates barcode regions in an RGB frame
pub trait BarcodeDetector: Send + Sync {
    /// Detections at or above `confidence_threshold`
    ///
    /// Implementations may return lower-confidence boxes; the recognizer
    /// filters them again.
    fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, RecognitionError>;
}

/// Reports the whole frame as a single certain detection
///
/// Used when no detection model is configured, leaving the decision to the
/// symbol decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullFrameDetector;

impl BarcodeDetector for FullFrameDetector {
    fn detect(
        &self,
        image: &RgbImage,
        _confidence_threshold: f32,
    ) -> Result<Vec<Detection>, RecognitionError> {
        Ok(vec![Detection {
            bbox: BoundingBox::full_frame(image),
            confidence: 1.0,
        }])
    }
}
