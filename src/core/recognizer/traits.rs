//! The narrow interface the orchestrator consumes from a recognition engine.

use super::types::{OriginalImage, PreparedImage, PreparedInputs, RawImage, TaskResult};
use crate::error::RecognizerError;
use serde::{Deserialize, Serialize};

/// A license-plate recognition engine.
///
/// Both strategy methods are called concurrently from two threads on the
/// same instance, so implementations must be safely reentrant. Inputs are
/// shared read-only.
pub trait PlateRecognizer: Send + Sync {
    /// Run the single pre-processing pass shared by both strategies
    fn preprocess(&self, image: &RawImage) -> Result<PreparedInputs, RecognizerError>;

    /// Locate and read the plate by shape/contour analysis
    fn recognize_by_shape(
        &self,
        prepared: &PreparedImage,
        original: &OriginalImage,
    ) -> Result<TaskResult, RecognizerError>;

    /// Locate and read the plate by background color
    fn recognize_by_color(
        &self,
        original: &OriginalImage,
        prepared: &PreparedImage,
    ) -> Result<TaskResult, RecognizerError>;

    /// Short name for logs and reports
    fn name(&self) -> &str {
        "recognizer"
    }
}

/// Tuning for the built-in recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Images wider than this are downscaled before recognition
    pub max_width: u32,
    /// Smallest candidate region, as a fraction of the image area
    pub min_area_ratio: f32,
    /// Accepted width/height ratio range for a plate candidate
    pub aspect_range: (f32, f32),
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            max_width: 1000,
            min_area_ratio: 0.002,
            aspect_range: (2.0, 5.5),
        }
    }
}

impl RecognizerConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), RecognizerError> {
        if self.max_width < 16 {
            return Err(RecognizerError::InvalidConfig(format!(
                "max_width must be at least 16 (got {})",
                self.max_width
            )));
        }
        if !(0.0..1.0).contains(&self.min_area_ratio) {
            return Err(RecognizerError::InvalidConfig(format!(
                "min_area_ratio must be in [0, 1) (got {})",
                self.min_area_ratio
            )));
        }
        let (low, high) = self.aspect_range;
        // Written positively so NaN bounds fail
        if !(low > 0.0 && low <= high && high.is_finite()) {
            return Err(RecognizerError::InvalidConfig(format!(
                "invalid aspect range {}..{}",
                low, high
            )));
        }
        Ok(())
    }
}
