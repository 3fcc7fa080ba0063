//! SIMD-accelerated downscaling for the pre-processing pass.
//!
//! Uses fast_image_resize, which picks AVX2/NEON paths when available.

use crate::error::RecognizerError;
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};

/// Convert to RGB and shrink so the width is at most `max_width`.
///
/// Images already narrow enough are converted but not resized; aspect
/// ratio is preserved.
pub fn downscale_to_width(
    image: &DynamicImage,
    max_width: u32,
) -> Result<RgbImage, RecognizerError> {
    let rgb = image.to_rgb8();
    let (src_width, src_height) = rgb.dimensions();

    if src_width == 0 || src_height == 0 {
        return Err(RecognizerError::EmptyImage);
    }

    if src_width <= max_width {
        return Ok(rgb);
    }

    let width = max_width;
    let height = ((src_height as u64 * max_width as u64) / src_width as u64).max(1) as u32;

    let src_image = Image::from_vec_u8(src_width, src_height, rgb.into_raw(), PixelType::U8x3)
        .map_err(|e| RecognizerError::Processing(format!("Failed to create source image: {}", e)))?;

    let mut dst_image = Image::new(width, height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(fast_image_resize::ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| RecognizerError::Processing(format!("Resize failed: {}", e)))?;

    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
            RecognizerError::Processing("Failed to create result buffer".to_string())
        })?;

    Ok(buffer)
}
