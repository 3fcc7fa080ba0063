//! Image decoding with a fast JPEG path.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::PlateError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use tracing::debug;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Image formats with a dedicated decode path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Other,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => Self::Jpeg,
            _ => Self::Other,
        }
    }
}

/// Decode the image at `path`.
///
/// Fails with [`PlateError::InputNotFound`] when the path is not a readable
/// file (whatever the I/O error) and [`PlateError::Decode`] when the bytes
/// are not an image.
pub fn decode_image(path: &Path) -> Result<DynamicImage, PlateError> {
    let bytes = fs::read(path).map_err(|e| {
        debug!(path = %path.display(), error = %e, "Image is not readable");
        PlateError::InputNotFound {
            path: path.to_path_buf(),
        }
    })?;

    if bytes.is_empty() {
        return Err(PlateError::Decode {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
        });
    }

    match ImageFormat::from_path(path) {
        ImageFormat::Jpeg => decode_jpeg(path, &bytes).or_else(|_| decode_fallback(path, &bytes)),
        ImageFormat::Other => decode_fallback(path, &bytes),
    }
}

/// Fast JPEG decoding using zune-jpeg
fn decode_jpeg(path: &Path, bytes: &[u8]) -> Result<DynamicImage, PlateError> {
    let decode_error = |reason: String| PlateError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
    let mut decoder = JpegDecoder::new_with_options(bytes, options);

    let pixels = decoder
        .decode()
        .map_err(|e| decode_error(format!("zune-jpeg decode failed: {:?}", e)))?;

    let info = decoder
        .info()
        .ok_or_else(|| decode_error("Failed to get image info".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;

    let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

    let image = match out_colorspace {
        ColorSpace::RGB => {
            let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, pixels)
                .ok_or_else(|| decode_error("Failed to create RGB buffer".to_string()))?;
            DynamicImage::ImageRgb8(buffer)
        }
        ColorSpace::RGBA => {
            let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| decode_error("Failed to create RGBA buffer".to_string()))?;
            DynamicImage::ImageRgba8(buffer)
        }
        ColorSpace::Luma => {
            let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                ImageBuffer::from_raw(width, height, pixels)
                    .ok_or_else(|| decode_error("Failed to create Luma buffer".to_string()))?;
            DynamicImage::ImageLuma8(buffer)
        }
        _ => return decode_fallback(path, bytes),
    };

    Ok(image)
}

fn decode_fallback(path: &Path, bytes: &[u8]) -> Result<DynamicImage, PlateError> {
    image::load_from_memory(bytes).map_err(|e| PlateError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
