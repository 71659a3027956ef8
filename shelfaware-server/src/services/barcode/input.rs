//! Image inputs accepted by the recognition pipeline
//!
//! Every representation is resolved once, at the pipeline boundary, into a
//! single RGB buffer.

use super::RecognitionError;
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};

/// Byte order of a raw three-channel pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Blue, green, red: camera frame layout
    Bgr,
    Rgb,
}

/// Raw interleaved 8-bit pixels
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub order: ChannelOrder,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn bgr(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, order: ChannelOrder::Bgr, data }
    }

    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, order: ChannelOrder::Rgb, data }
    }
}

/// An image in any of the supported representations
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Image file on disk
    Path(PathBuf),
    /// Raw pixel array
    Pixels(PixelBuffer),
    /// Already decoded image object
    Decoded(DynamicImage),
    /// Encoded image file contents (PNG, JPEG, ...)
    Encoded(Vec<u8>),
}

impl ImageInput {
    /// Resolve to an RGB pixel buffer
    pub fn into_rgb(self) -> Result<RgbImage, RecognitionError> {
        match self {
            ImageInput::Path(path) => Ok(image::open(&path)?.into_rgb8()),
            ImageInput::Pixels(pixels) => pixels_to_rgb(pixels),
            ImageInput::Decoded(image) => Ok(image.into_rgb8()),
            ImageInput::Encoded(bytes) => Ok(image::load_from_memory(&bytes)?.into_rgb8()),
        }
    }
}

fn pixels_to_rgb(pixels: PixelBuffer) -> Result<RgbImage, RecognitionError> {
    let PixelBuffer { width, height, order, mut data } = pixels;

    let expected = width as usize * height as usize * 3;
    if width == 0 || height == 0 || data.len() != expected {
        return Err(RecognitionError::InvalidArgument(format!(
            "Pixel buffer of {} bytes does not match {}x{} with 3 channels",
            data.len(),
            width,
            height
        )));
    }

    if order == ChannelOrder::Bgr {
        data.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
    }

    RgbImage::from_raw(width, height, data).ok_or_else(|| {
        RecognitionError::InvalidArgument(format!("Unusable {}x{} pixel buffer", width, height))
    })
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<&Path> for ImageInput {
    fn from(path: &Path) -> Self {
        ImageInput::Path(path.to_path_buf())
    }
}

impl From<PixelBuffer> for ImageInput {
    fn from(pixels: PixelBuffer) -> Self {
        ImageInput::Pixels(pixels)
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        ImageInput::Decoded(image)
    }
}
