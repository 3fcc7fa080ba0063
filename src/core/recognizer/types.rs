//! Data types shared by every recognition strategy.

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Plate background color classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateColor {
    Blue,
    Yellow,
    Green,
    White,
    Black,
    /// No classification could be made
    #[default]
    Unknown,
}

impl PlateColor {
    /// Whether this is a real classification rather than the sentinel
    pub fn is_known(&self) -> bool {
        !matches!(self, PlateColor::Unknown)
    }
}

impl std::fmt::Display for PlateColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlateColor::Blue => write!(f, "blue"),
            PlateColor::Yellow => write!(f, "yellow"),
            PlateColor::Green => write!(f, "green"),
            PlateColor::White => write!(f, "white"),
            PlateColor::Black => write!(f, "black"),
            PlateColor::Unknown => write!(f, "unknown"),
        }
    }
}

/// A cropped candidate plate region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionImage {
    pixels: RgbImage,
}

impl RegionImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Save the region to disk; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        self.pixels.save(path)
    }
}

/// Result of one strategy invocation.
///
/// Always fully populated: "nothing found" is an empty label, no region
/// and [`PlateColor::Unknown`], never a missing field.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    label: Vec<char>,
    region: Option<RegionImage>,
    color: PlateColor,
}

impl TaskResult {
    pub fn new(label: Vec<char>, region: Option<RegionImage>, color: PlateColor) -> Self {
        Self {
            label,
            region,
            color,
        }
    }

    /// A valid result for a strategy that found no plate
    pub fn empty() -> Self {
        Self::new(Vec::new(), None, PlateColor::Unknown)
    }

    pub fn label(&self) -> &[char] {
        &self.label
    }

    /// The label joined into a string
    pub fn label_text(&self) -> String {
        self.label.iter().collect()
    }

    pub fn region(&self) -> Option<&RegionImage> {
        self.region.as_ref()
    }

    pub fn color(&self) -> PlateColor {
        self.color
    }

    /// Whether the strategy produced any plate text
    pub fn is_recognized(&self) -> bool {
        !self.label.is_empty()
    }

    /// Split into the `(label, region, color)` triple
    pub fn into_parts(self) -> (Vec<char>, Option<RegionImage>, PlateColor) {
        (self.label, self.region, self.color)
    }
}

impl From<(Vec<char>, Option<RegionImage>, PlateColor)> for TaskResult {
    fn from((label, region, color): (Vec<char>, Option<RegionImage>, PlateColor)) -> Self {
        Self::new(label, region, color)
    }
}

/// The pre-processed image handed to both strategies.
///
/// Cheap to clone; the pixels are shared and never written.
#[derive(Debug, Clone)]
pub struct PreparedImage(Arc<GrayImage>);

impl PreparedImage {
    pub fn new(image: GrayImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

/// The original (possibly downscaled) color image shared by both strategies
#[derive(Debug, Clone)]
pub struct OriginalImage(Arc<RgbImage>);

impl OriginalImage {
    pub fn new(image: RgbImage) -> Self {
        Self(Arc::new(image))
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

/// Output of the single pre-processing pass
#[derive(Debug, Clone)]
pub struct PreparedInputs {
    pub prepared: PreparedImage,
    pub original: OriginalImage,
}

/// A decoded input image
pub type RawImage = DynamicImage;
