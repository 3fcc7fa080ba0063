//! Single-line machine-readable output.

use super::ResultEncoder;
use crate::core::orchestrator::OrchestrationOutcome;
use crate::core::recognizer::TaskResult;

/// Placeholder written for a strategy that read no plate text
pub const UNRECOGNIZED: &str = "未识别";

/// Separates the shape and color fields
pub const FIELD_SEPARATOR: &str = "|||";

/// Encodes an outcome as `"{shape}|||{color}"`
#[derive(Debug, Clone)]
pub struct LineEncoder {
    shape_sentinel: String,
    color_sentinel: String,
}

impl LineEncoder {
    pub fn new() -> Self {
        Self {
            shape_sentinel: UNRECOGNIZED.to_string(),
            color_sentinel: UNRECOGNIZED.to_string(),
        }
    }

    /// Use a custom placeholder for empty labels on both sides
    pub fn with_sentinel(sentinel: impl Into<String>) -> Self {
        let sentinel = sentinel.into();
        Self {
            shape_sentinel: sentinel.clone(),
            color_sentinel: sentinel,
        }
    }

    fn field<'a>(result: &TaskResult, sentinel: &'a str) -> std::borrow::Cow<'a, str> {
        if result.is_recognized() {
            std::borrow::Cow::Owned(result.label_text())
        } else {
            std::borrow::Cow::Borrowed(sentinel)
        }
    }
}

impl Default for LineEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultEncoder for LineEncoder {
    fn encode(&self, outcome: &OrchestrationOutcome) -> String {
        format!(
            "{}{}{}",
            Self::field(outcome.shape(), &self.shape_sentinel),
            FIELD_SEPARATOR,
            Self::field(outcome.color(), &self.color_sentinel)
        )
    }
}
