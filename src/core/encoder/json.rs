//! JSON output for scripting.

use super::ResultEncoder;
use crate::core::orchestrator::{OrchestrationOutcome, Strategy};
use crate::core::recognizer::{PlateColor, TaskResult};
use crate::error::PlateError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use uuid::Uuid;

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: Uuid,
    image: Cow<'a, str>,
    completed_at: DateTime<Utc>,
    elapsed_ms: u64,
    shape: JsonStrategy,
    color: JsonStrategy,
}

#[derive(Serialize)]
struct JsonStrategy {
    label: String,
    recognized: bool,
    plate_color: PlateColor,
    /// (width, height) of the candidate region
    region: Option<(u32, u32)>,
    duration_ms: u64,
}

#[derive(Serialize)]
struct JsonFailure {
    error: String,
    stage: &'static str,
    strategy: Option<Strategy>,
    path: Option<String>,
}

impl JsonStrategy {
    fn new(result: &TaskResult, duration_ms: u64) -> Self {
        Self {
            label: result.label_text(),
            recognized: result.is_recognized(),
            plate_color: result.color(),
            region: result.region().map(|r| (r.width(), r.height())),
            duration_ms,
        }
    }
}

/// Encodes outcomes as JSON documents
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    pretty: bool,
}

impl JsonEncoder {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|e| {
            serde_json::json!({
                "error": format!("Failed to encode result: {}", e),
                "stage": "output",
            })
            .to_string()
        })
    }
}

impl ResultEncoder for JsonEncoder {
    fn encode(&self, outcome: &OrchestrationOutcome) -> String {
        let timings = outcome.timings();
        let report = JsonReport {
            run_id: outcome.run_id(),
            image: outcome.image_path().to_string_lossy(),
            completed_at: outcome.completed_at(),
            elapsed_ms: outcome.elapsed().as_millis() as u64,
            shape: JsonStrategy::new(outcome.shape(), timings.shape.as_millis() as u64),
            color: JsonStrategy::new(outcome.color(), timings.color.as_millis() as u64),
        };
        self.render(&report)
    }

    fn encode_failure(&self, error: &PlateError) -> String {
        let path = match error {
            PlateError::InputNotFound { path } | PlateError::Decode { path, .. } => {
                Some(path.to_string_lossy().into_owned())
            }
            _ => None,
        };
        self.render(&JsonFailure {
            error: error.to_string(),
            stage: error.stage(),
            strategy: error.strategy(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::orchestrator::StrategyTimings;
    use crate::core::recognizer::RegionImage;
    use image::RgbImage;
    use std::path::PathBuf;
    use std::time::Duration;

    fn outcome() -> OrchestrationOutcome {
        OrchestrationOutcome::new(
            Uuid::nil(),
            PathBuf::from("/plates/car.jpg"),
            TaskResult::new(
                "京A12345".chars().collect(),
                Some(RegionImage::new(RgbImage::new(200, 50))),
                PlateColor::Blue,
            ),
            TaskResult::empty(),
            Duration::from_millis(152),
            StrategyTimings {
                shape: Duration::from_millis(100),
                color: Duration::from_millis(150),
            },
        )
    }

    #[test]
    fn outcome_json_has_both_strategies() {
        let json = JsonEncoder::new(false).encode(&outcome());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["shape"]["label"], "京A12345");
        assert_eq!(value["shape"]["plate_color"], "blue");
        assert_eq!(value["shape"]["region"], serde_json::json!([200, 50]));
        assert_eq!(value["color"]["recognized"], false);
        assert_eq!(value["color"]["plate_color"], "unknown");
        assert_eq!(value["elapsed_ms"], 152);
        assert_eq!(value["color"]["duration_ms"], 150);
    }

    #[test]
    fn failure_json_names_stage_and_strategy() {
        let error = PlateError::StrategyTimeout {
            strategy: Strategy::Color,
            timeout: Duration::from_millis(500),
        };
        let json = JsonEncoder::new(true).encode_failure(&error);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stage"], "color strategy");
        assert_eq!(value["strategy"], "color");
        assert!(value["path"].is_null());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_still_produce_json() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/plates/car\xff.jpg"));
        let outcome = OrchestrationOutcome::new(
            Uuid::nil(),
            path.clone(),
            TaskResult::empty(),
            TaskResult::empty(),
            Duration::ZERO,
            StrategyTimings::default(),
        );

        let json = JsonEncoder::new(false).encode(&outcome);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["image"], "/plates/car\u{FFFD}.jpg");

        let failure = JsonEncoder::new(false).encode_failure(&PlateError::InputNotFound { path });
        let value: serde_json::Value = serde_json::from_str(&failure).unwrap();
        assert_eq!(value["stage"], "input");
        assert_eq!(value["path"], "/plates/car\u{FFFD}.jpg");
    }
}
