//! Built-in recognizer using edge-density and color-mask localisation.
//!
//! Locates a plate candidate and classifies its background color. Reading
//! the characters needs a trained classifier, so labels are always empty;
//! plug a full engine in through [`PlateRecognizer`] to get text.

use super::resize::downscale_to_width;
use super::traits::{PlateRecognizer, RecognizerConfig};
use super::types::{
    OriginalImage, PlateColor, PreparedImage, PreparedInputs, RawImage, RegionImage, TaskResult,
};
use crate::error::RecognizerError;
use image::{imageops, GrayImage, Rgb, RgbImage};
use tracing::debug;

/// Minimum horizontal intensity step counted as an edge
const EDGE_THRESHOLD: i16 = 24;

/// Fraction of pixels a color needs to win the classification
const COLOR_DOMINANCE: f32 = 0.3;

/// Gaussian sigma of the pre-processing blur
const BLUR_SIGMA: f32 = 1.0;

/// Recognizer that needs no model files
#[derive(Debug, Clone, Default)]
pub struct HeuristicRecognizer {
    config: RecognizerConfig,
}

impl HeuristicRecognizer {
    /// Create a recognizer, validating the configuration
    pub fn new(config: RecognizerConfig) -> Result<Self, RecognizerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Accept a candidate box if its size and shape look like a plate
    fn accept(&self, bounds: Bounds, image_area: u64) -> bool {
        let area = bounds.width() as u64 * bounds.height() as u64;
        if image_area == 0 {
            return false;
        }
        let area_ratio = area as f64 / image_area as f64;
        if area_ratio < self.config.min_area_ratio as f64 {
            return false;
        }
        let aspect = bounds.width() as f32 / bounds.height().max(1) as f32;
        let (low, high) = self.config.aspect_range;
        (low..=high).contains(&aspect)
    }
}

impl PlateRecognizer for HeuristicRecognizer {
    fn preprocess(&self, image: &RawImage) -> Result<PreparedInputs, RecognizerError> {
        let original = downscale_to_width(image, self.config.max_width)?;
        let gray = imageops::grayscale(&original);
        let prepared = imageops::blur(&gray, BLUR_SIGMA);

        debug!(
            width = original.width(),
            height = original.height(),
            "Pre-processed image"
        );

        Ok(PreparedInputs {
            prepared: PreparedImage::new(prepared),
            original: OriginalImage::new(original),
        })
    }

    fn recognize_by_shape(
        &self,
        prepared: &PreparedImage,
        original: &OriginalImage,
    ) -> Result<TaskResult, RecognizerError> {
        ensure_same_dimensions(prepared, original)?;

        let (width, height) = prepared.dimensions();
        let Some(bounds) = locate_edge_band(prepared.pixels()) else {
            debug!("Shape strategy found no edge band");
            return Ok(TaskResult::empty());
        };

        if !self.accept(bounds, width as u64 * height as u64) {
            debug!(?bounds, "Shape candidate rejected");
            return Ok(TaskResult::empty());
        }

        let crop = bounds.crop(original.pixels());
        let color = classify_color(&crop);
        debug!(?bounds, %color, "Shape strategy found candidate");

        Ok(TaskResult::new(Vec::new(), Some(RegionImage::new(crop)), color))
    }

    fn recognize_by_color(
        &self,
        original: &OriginalImage,
        prepared: &PreparedImage,
    ) -> Result<TaskResult, RecognizerError> {
        ensure_same_dimensions(prepared, original)?;

        let pixels = original.pixels();
        let Some(color) = dominant_plate_color(pixels) else {
            debug!("Color strategy found no plate-colored pixels");
            return Ok(TaskResult::empty());
        };

        let Some(bounds) = locate_color_mask(pixels, color) else {
            return Ok(TaskResult::empty());
        };

        let (width, height) = original.dimensions();
        if !self.accept(bounds, width as u64 * height as u64) {
            debug!(?bounds, %color, "Color candidate rejected");
            return Ok(TaskResult::empty());
        }

        let crop = bounds.crop(pixels);
        debug!(?bounds, %color, "Color strategy found candidate");

        Ok(TaskResult::new(Vec::new(), Some(RegionImage::new(crop)), color))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Build the built-in recognizer, failing on unusable configuration.
pub fn initialize_recognizer(
    config: &RecognizerConfig,
) -> Result<HeuristicRecognizer, RecognizerError> {
    HeuristicRecognizer::new(config.clone())
}

fn ensure_same_dimensions(
    prepared: &PreparedImage,
    original: &OriginalImage,
) -> Result<(), RecognizerError> {
    if prepared.dimensions() != original.dimensions() {
        return Err(RecognizerError::Processing(format!(
            "prepared image is {:?} but original is {:?}",
            prepared.dimensions(),
            original.dimensions()
        )));
    }
    if prepared.dimensions().0 == 0 || prepared.dimensions().1 == 0 {
        return Err(RecognizerError::EmptyImage);
    }
    Ok(())
}

/// Inclusive pixel bounds of a candidate region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl Bounds {
    fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    fn crop(&self, image: &RgbImage) -> RgbImage {
        imageops::crop_imm(image, self.left, self.top, self.width(), self.height()).to_image()
    }
}

/// Grow a band around the peak of `scores` while scores stay above `ratio` of the peak.
fn peak_band(scores: &[u32], ratio: f32) -> Option<(usize, usize)> {
    let (peak_index, &peak) = scores.iter().enumerate().max_by_key(|(_, s)| **s)?;
    if peak == 0 {
        return None;
    }
    let floor = (peak as f32 * ratio).ceil() as u32;

    let mut start = peak_index;
    while start > 0 && scores[start - 1] >= floor {
        start -= 1;
    }
    let mut end = peak_index;
    while end + 1 < scores.len() && scores[end + 1] >= floor {
        end += 1;
    }
    Some((start, end))
}

/// First and last index whose score reaches `floor`
fn outer_span(scores: &[u32], floor: u32) -> Option<(usize, usize)> {
    let first = scores.iter().position(|s| *s >= floor.max(1))?;
    let last = scores.iter().rposition(|s| *s >= floor.max(1))?;
    Some((first, last))
}

/// Find the densest band of vertical strokes, where plate characters sit.
fn locate_edge_band(gray: &GrayImage) -> Option<Bounds> {
    let (width, height) = gray.dimensions();
    if width < 2 {
        return None;
    }

    let is_edge = |x: u32, y: u32| {
        let a = gray.get_pixel(x, y)[0] as i16;
        let b = gray.get_pixel(x + 1, y)[0] as i16;
        (a - b).abs() >= EDGE_THRESHOLD
    };

    let row_scores: Vec<u32> = (0..height)
        .map(|y| (0..width - 1).filter(|&x| is_edge(x, y)).count() as u32)
        .collect();
    let (top, bottom) = peak_band(&row_scores, 0.5)?;

    let band_height = (bottom - top + 1) as u32;
    let column_scores: Vec<u32> = (0..width - 1)
        .map(|x| {
            (top as u32..=bottom as u32)
                .filter(|&y| is_edge(x, y))
                .count() as u32
        })
        .collect();
    let (left, right) = outer_span(&column_scores, band_height / 4)?;

    Some(Bounds {
        left: left as u32,
        top: top as u32,
        right: (right as u32 + 1).min(width - 1),
        bottom: bottom as u32,
    })
}

/// Bounding box of the densest `color` region
fn locate_color_mask(image: &RgbImage, color: PlateColor) -> Option<Bounds> {
    let (width, height) = image.dimensions();
    let matches = |x: u32, y: u32| classify_pixel(image.get_pixel(x, y)) == color;

    let row_scores: Vec<u32> = (0..height)
        .map(|y| (0..width).filter(|&x| matches(x, y)).count() as u32)
        .collect();
    let (top, bottom) = peak_band(&row_scores, 0.3)?;

    let band_height = (bottom - top + 1) as u32;
    let column_scores: Vec<u32> = (0..width)
        .map(|x| {
            (top as u32..=bottom as u32)
                .filter(|&y| matches(x, y))
                .count() as u32
        })
        .collect();
    let (left, right) = outer_span(&column_scores, band_height / 2)?;

    Some(Bounds {
        left: left as u32,
        top: top as u32,
        right: right as u32,
        bottom: bottom as u32,
    })
}

/// The plate background color (blue, yellow, green) most present in the image
fn dominant_plate_color(image: &RgbImage) -> Option<PlateColor> {
    let mut counts = [0u32; 3];
    for pixel in image.pixels() {
        match classify_pixel(pixel) {
            PlateColor::Blue => counts[0] += 1,
            PlateColor::Yellow => counts[1] += 1,
            PlateColor::Green => counts[2] += 1,
            _ => {}
        }
    }

    let candidates = [PlateColor::Blue, PlateColor::Yellow, PlateColor::Green];
    counts
        .iter()
        .zip(candidates)
        .filter(|(count, _)| **count > 0)
        .max_by_key(|(count, _)| **count)
        .map(|(_, color)| color)
}

/// Classify a region by its dominant background color
pub(crate) fn classify_color(region: &RgbImage) -> PlateColor {
    let total = region.width() as u64 * region.height() as u64;
    if total == 0 {
        return PlateColor::Unknown;
    }

    let mut counts = [0u64; 5];
    let colors = [
        PlateColor::Blue,
        PlateColor::Yellow,
        PlateColor::Green,
        PlateColor::White,
        PlateColor::Black,
    ];

    for pixel in region.pixels() {
        if let Some(index) = colors.iter().position(|c| *c == classify_pixel(pixel)) {
            counts[index] += 1;
        }
    }

    let (index, count) = counts
        .iter()
        .enumerate()
        .max_by_key(|(_, c)| **c)
        .map(|(i, c)| (i, *c))
        .unwrap_or((0, 0));

    if (count as f32 / total as f32) < COLOR_DOMINANCE {
        PlateColor::Unknown
    } else {
        colors[index]
    }
}

fn classify_pixel(pixel: &Rgb<u8>) -> PlateColor {
    let (hue, saturation, value) = rgb_to_hsv(pixel);

    if value < 0.2 {
        return PlateColor::Black;
    }
    if saturation < 0.15 {
        return if value > 0.75 {
            PlateColor::White
        } else {
            PlateColor::Unknown
        };
    }
    if saturation < 0.3 {
        return PlateColor::Unknown;
    }

    match hue {
        h if (190.0..=255.0).contains(&h) => PlateColor::Blue,
        h if (35.0..=70.0).contains(&h) && value > 0.3 => PlateColor::Yellow,
        h if (75.0..=165.0).contains(&h) => PlateColor::Green,
        _ => PlateColor::Unknown,
    }
}

/// Hue in degrees, saturation and value in `0.0..=1.0`
fn rgb_to_hsv(pixel: &Rgb<u8>) -> (f32, f32, f32) {
    let [r, g, b] = pixel.0.map(|c| c as f32 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let saturation = if max == 0.0 { 0.0 } else { delta / max };
    (hue, saturation, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    const PLATE_BLUE: Rgb<u8> = Rgb([10, 60, 200]);
    const BACKGROUND: Rgb<u8> = Rgb([128, 128, 128]);

    /// Gray scene with a 200x50 blue plate carrying white character strokes
    fn synthetic_scene() -> DynamicImage {
        let image = RgbImage::from_fn(400, 300, |x, y| {
            let inside = (100..300).contains(&x) && (120..170).contains(&y);
            if !inside {
                return BACKGROUND;
            }
            let stroke = (x - 100) % 12 >= 9 && (x - 100) >= 12 && (x - 100) < 188;
            if stroke && (124..166).contains(&y) {
                Rgb([250, 250, 250])
            } else {
                PLATE_BLUE
            }
        });
        DynamicImage::ImageRgb8(image)
    }

    fn recognizer() -> HeuristicRecognizer {
        HeuristicRecognizer::new(RecognizerConfig::default()).unwrap()
    }

    #[test]
    fn preprocess_keeps_dimensions_aligned() {
        let inputs = recognizer().preprocess(&synthetic_scene()).unwrap();
        assert_eq!(inputs.prepared.dimensions(), inputs.original.dimensions());
        assert_eq!(inputs.original.dimensions(), (400, 300));
    }

    #[test]
    fn preprocess_downscales_wide_images() {
        let config = RecognizerConfig {
            max_width: 200,
            ..RecognizerConfig::default()
        };
        let recognizer = HeuristicRecognizer::new(config).unwrap();
        let inputs = recognizer.preprocess(&synthetic_scene()).unwrap();
        assert_eq!(inputs.original.dimensions(), (200, 150));
    }

    #[test]
    fn shape_strategy_finds_blue_plate() {
        let recognizer = recognizer();
        let inputs = recognizer.preprocess(&synthetic_scene()).unwrap();

        let result = recognizer
            .recognize_by_shape(&inputs.prepared, &inputs.original)
            .unwrap();

        let region = result.region().expect("plate region");
        assert!((150..=215).contains(&region.width()), "width {}", region.width());
        assert_eq!(result.color(), PlateColor::Blue);
        assert!(!result.is_recognized());
    }

    #[test]
    fn color_strategy_finds_blue_plate() {
        let recognizer = recognizer();
        let inputs = recognizer.preprocess(&synthetic_scene()).unwrap();

        let result = recognizer
            .recognize_by_color(&inputs.original, &inputs.prepared)
            .unwrap();

        let region = result.region().expect("plate region");
        assert_eq!(region.width(), 200);
        assert_eq!(region.height(), 50);
        assert_eq!(result.color(), PlateColor::Blue);
    }

    #[test]
    fn blank_scene_yields_empty_results_not_errors() {
        let recognizer = recognizer();
        let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, BACKGROUND));
        let inputs = recognizer.preprocess(&blank).unwrap();

        let shape = recognizer
            .recognize_by_shape(&inputs.prepared, &inputs.original)
            .unwrap();
        let color = recognizer
            .recognize_by_color(&inputs.original, &inputs.prepared)
            .unwrap();

        assert_eq!(shape, TaskResult::empty());
        assert_eq!(color, TaskResult::empty());
    }

    #[test]
    fn mismatched_inputs_are_a_processing_error() {
        let recognizer = recognizer();
        let prepared = PreparedImage::new(GrayImage::new(10, 10));
        let original = OriginalImage::new(RgbImage::new(20, 10));

        let result = recognizer.recognize_by_shape(&prepared, &original);
        assert!(matches!(result, Err(RecognizerError::Processing(_))));
    }

    #[test]
    fn invalid_config_fails_initialization() {
        let config = RecognizerConfig {
            max_width: 0,
            ..RecognizerConfig::default()
        };
        assert!(initialize_recognizer(&config).is_err());
    }

    #[test]
    fn pixel_classification() {
        assert_eq!(classify_pixel(&PLATE_BLUE), PlateColor::Blue);
        assert_eq!(classify_pixel(&Rgb([230, 190, 20])), PlateColor::Yellow);
        assert_eq!(classify_pixel(&Rgb([30, 180, 90])), PlateColor::Green);
        assert_eq!(classify_pixel(&Rgb([245, 245, 245])), PlateColor::White);
        assert_eq!(classify_pixel(&Rgb([10, 10, 10])), PlateColor::Black);
        assert_eq!(classify_pixel(&BACKGROUND), PlateColor::Unknown);
    }

    #[test]
    fn region_color_needs_a_clear_majority() {
        let mixed = RgbImage::from_fn(12, 10, |x, _| match x % 4 {
            0 => PLATE_BLUE,
            1 => Rgb([230, 190, 20]),
            2 => Rgb([30, 180, 90]),
            _ => BACKGROUND,
        });
        assert_eq!(classify_color(&mixed), PlateColor::Unknown);
        assert_eq!(
            classify_color(&RgbImage::from_pixel(5, 5, PLATE_BLUE)),
            PlateColor::Blue
        );
    }
}
