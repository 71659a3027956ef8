//! Locate-then-decode composition

use super::{
    BarcodeDetector, DecodedSymbol, FullFrameDetector, ImageInput, RecognitionError,
    RxingDecoder, SymbolDecoder,
};
use image::RgbImage;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Which image regions are handed to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionStrategy {
    /// The whole frame, once, whenever any detection clears the threshold.
    /// Decoding the full frame is more robust than decoding tight crops.
    #[default]
    FullFrame,
    /// One crop per detection box
    CropDetections,
}

pub struct BarcodeRecognizer {
    detector: Box<dyn BarcodeDetector>,
    decoder: Box<dyn SymbolDecoder>,
    confidence_threshold: f32,
    region_strategy: RegionStrategy,
}

impl BarcodeRecognizer {
    pub fn new(
        detector: Box<dyn BarcodeDetector>,
        decoder: Box<dyn SymbolDecoder>,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            detector,
            decoder,
            confidence_threshold,
            region_strategy: RegionStrategy::default(),
        }
    }

    /// Full-frame detection with the rxing decoder
    pub fn with_default_backends(confidence_threshold: f32) -> Self {
        Self::new(Box::new(FullFrameDetector), Box::new(RxingDecoder), confidence_threshold)
    }

    pub fn with_region_strategy(mut self, region_strategy: RegionStrategy) -> Self {
        self.region_strategy = region_strategy;
        self
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Candidate barcode regions of `input`
    ///
    /// Empty when no detection reaches the confidence threshold.
    pub fn locate(&self, input: ImageInput) -> Result<Vec<RgbImage>, RecognitionError> {
        let image = input.into_rgb()?;

        let detections: Vec<_> = self
            .detector
            .detect(&image, self.confidence_threshold)?
            .into_iter()
            .filter(|d| d.confidence >= self.confidence_threshold)
            .collect();

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            detections = detections.len(),
            threshold = self.confidence_threshold,
            "Barcode detection complete"
        );

        if detections.is_empty() {
            return Ok(Vec::new());
        }

        match self.region_strategy {
            RegionStrategy::FullFrame => Ok(vec![image]),
            RegionStrategy::CropDetections => {
                let (width, height) = image.dimensions();
                Ok(detections
                    .iter()
                    .filter_map(|d| d.bbox.clamp_to(width, height))
                    .map(|b| {
                        image::imageops::crop_imm(&image, b.x1, b.y1, b.width(), b.height())
                            .to_image()
                    })
                    .collect())
            }
        }
    }

    /// Every symbol found in every candidate image, in order
    pub fn decode(&self, images: &[RgbImage]) -> Vec<DecodedSymbol> {
        images
            .iter()
            .flat_map(|image| self.decoder.decode(image))
            .collect()
    }

    /// `locate` followed by `decode`
    pub fn recognize(&self, input: ImageInput) -> Result<Vec<DecodedSymbol>, RecognitionError> {
        let regions = self.locate(input)?;
        let symbols = self.decode(&regions);

        tracing::info!(
            regions = regions.len(),
            symbols = symbols.len(),
            "Barcode recognition complete"
        );

        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::barcode::{BoundingBox, Detection, PixelBuffer};

    struct FixedDetector(Vec<Detection>);

    impl BarcodeDetector for FixedDetector {
        fn detect(
            &self,
            _image: &RgbImage,
            _confidence_threshold: f32,
        ) -> Result<Vec<Detection>, RecognitionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingDetector;

    impl BarcodeDetector for FailingDetector {
        fn detect(&self, _: &RgbImage, _: f32) -> Result<Vec<Detection>, RecognitionError> {
            Err(RecognitionError::Detector("model unavailable".to_string()))
        }
    }

    /// Reports the region size as the symbol payload
    struct SizeDecoder {
        symbols_per_image: usize,
    }

    impl SymbolDecoder for SizeDecoder {
        fn decode(&self, image: &RgbImage) -> Vec<DecodedSymbol> {
            (0..self.symbols_per_image)
                .map(|i| DecodedSymbol {
                    symbol_type: "EAN13".to_string(),
                    data: format!("{}x{}#{}", image.width(), image.height(), i),
                })
                .collect()
        }
    }

    fn detection(x1: u32, y1: u32, x2: u32, y2: u32, confidence: f32) -> Detection {
        Detection { bbox: BoundingBox { x1, y1, x2, y2 }, confidence }
    }

    fn frame() -> ImageInput {
        PixelBuffer::rgb(40, 20, vec![128; 40 * 20 * 3]).into()
    }

    fn recognizer(detections: Vec<Detection>, symbols_per_image: usize) -> BarcodeRecognizer {
        BarcodeRecognizer::new(
            Box::new(FixedDetector(detections)),
            Box::new(SizeDecoder { symbols_per_image }),
            0.5,
        )
    }

    #[test]
    fn test_no_detections_yield_no_regions() {
        let regions = recognizer(Vec::new(), 1).locate(frame()).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_low_confidence_detections_are_ignored() {
        let regions = recognizer(vec![detection(0, 0, 10, 10, 0.2)], 1)
            .locate(frame())
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_full_frame_returned_once_for_any_detections() {
        let detections = vec![detection(0, 0, 10, 10, 0.9), detection(20, 5, 30, 15, 0.7)];
        let regions = recognizer(detections, 1).locate(frame()).unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].dimensions(), (40, 20));
    }

    #[test]
    fn test_crop_strategy_returns_one_region_per_box() {
        let detections = vec![
            detection(0, 0, 10, 10, 0.9),
            detection(30, 10, 60, 40, 0.8),
            detection(5, 5, 6, 6, 0.1),
        ];
        let regions = recognizer(detections, 1)
            .with_region_strategy(RegionStrategy::CropDetections)
            .locate(frame())
            .unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].dimensions(), (10, 10));
        assert_eq!(regions[1].dimensions(), (10, 10));
    }

    #[test]
    fn test_decode_flattens_symbols_across_images() {
        let recognizer = recognizer(Vec::new(), 2);
        let images = vec![RgbImage::new(3, 4), RgbImage::new(5, 6)];

        let symbols = recognizer.decode(&images);
        let data: Vec<_> = symbols.iter().map(|s| s.data.as_str()).collect();
        assert_eq!(data, vec!["3x4#0", "3x4#1", "5x6#0", "5x6#1"]);
    }

    #[test]
    fn test_decode_of_nothing_is_empty() {
        assert!(recognizer(Vec::new(), 0).decode(&[RgbImage::new(2, 2)]).is_empty());
        assert!(recognizer(Vec::new(), 3).decode(&[]).is_empty());
    }

    #[test]
    fn test_recognize_composes_locate_and_decode() {
        let symbols = recognizer(vec![detection(0, 0, 5, 5, 0.5)], 1)
            .recognize(frame())
            .unwrap();
        assert_eq!(
            symbols,
            vec![DecodedSymbol { symbol_type: "EAN13".to_string(), data: "40x20#0".to_string() }]
        );
    }

    #[test]
    fn test_invalid_input_is_reported_before_detection() {
        let bad = ImageInput::Pixels(PixelBuffer::bgr(10, 10, vec![0; 7]));
        let result = recognizer(vec![detection(0, 0, 5, 5, 1.0)], 1).recognize(bad);
        assert!(matches!(result, Err(RecognitionError::InvalidArgument(_))));
    }

    #[test]
    fn test_detector_failure_propagates() {
        let recognizer = BarcodeRecognizer::new(
            Box::new(FailingDetector),
            Box::new(SizeDecoder { symbols_per_image: 1 }),
            0.5,
        );
        assert!(matches!(recognizer.locate(frame()), Err(RecognitionError::Detector(_))));
    }

    #[test]
    fn test_default_backends_on_blank_frame() {
        let recognizer = BarcodeRecognizer::with_default_backends(DEFAULT_CONFIDENCE_THRESHOLD);
        let blank = PixelBuffer::rgb(64, 64, vec![255; 64 * 64 * 3]);

        assert_eq!(recognizer.locate(blank.clone().into()).unwrap().len(), 1);
        assert!(recognizer.recognize(blank.into()).unwrap().is_empty());
    }
}
