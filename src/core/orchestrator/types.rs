//! Outcome and configuration types for the orchestrator.

use crate::core::recognizer::TaskResult;
use crate::error::PlateError;
use crate::events::RunSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// The two recognition strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Shape/contour based plate location
    Shape,
    /// Background color based plate location
    Color,
}

impl Strategy {
    /// Name of the worker thread running this strategy
    pub fn thread_name(&self) -> &'static str {
        match self {
            Strategy::Shape => "plate-shape",
            Strategy::Color => "plate-color",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Shape => write!(f, "shape"),
            Strategy::Color => write!(f, "color"),
        }
    }
}

/// Which strategy thread is spawned first.
///
/// Has no effect on the outcome; the shape result is always reported first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchOrder {
    #[default]
    ShapeFirst,
    ColorFirst,
}

/// Configuration for the orchestrator
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Upper bound on the concurrent phase; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Spawn order of the two strategy threads
    pub launch_order: LaunchOrder,
}

/// Time each strategy spent inside its own thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrategyTimings {
    pub shape: Duration,
    pub color: Duration,
}

impl StrategyTimings {
    /// What the two strategies would have taken back to back
    pub fn sequential(&self) -> Duration {
        self.shape + self.color
    }
}

/// The merged result of both strategies for one image.
///
/// Both results are always present; a run that lost either strategy is an
/// error instead.
#[derive(Debug, Clone)]
pub struct OrchestrationOutcome {
    run_id: Uuid,
    image_path: PathBuf,
    shape: TaskResult,
    color: TaskResult,
    elapsed: Duration,
    timings: StrategyTimings,
    completed_at: DateTime<Utc>,
}

impl OrchestrationOutcome {
    pub(crate) fn new(
        run_id: Uuid,
        image_path: PathBuf,
        shape: TaskResult,
        color: TaskResult,
        elapsed: Duration,
        timings: StrategyTimings,
    ) -> Self {
        Self {
            run_id,
            image_path,
            shape,
            color,
            elapsed,
            timings,
            completed_at: Utc::now(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Result of the shape/contour strategy
    pub fn shape(&self) -> &TaskResult {
        &self.shape
    }

    /// Result of the color strategy
    pub fn color(&self) -> &TaskResult {
        &self.color
    }

    /// Result for `strategy`
    pub fn result(&self, strategy: Strategy) -> &TaskResult {
        match strategy {
            Strategy::Shape => &self.shape,
            Strategy::Color => &self.color,
        }
    }

    /// Wall-clock time from launching both tasks until both were joined
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn timings(&self) -> StrategyTimings {
        self.timings
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Both results, shape first
    pub fn into_results(self) -> (TaskResult, TaskResult) {
        (self.shape, self.color)
    }

    /// Write each found region to `dir` as `shape.png` / `color.png`.
    ///
    /// Returns the paths written; strategies without a region are skipped.
    pub fn save_regions(&self, dir: &Path) -> Result<Vec<PathBuf>, PlateError> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for strategy in [Strategy::Shape, Strategy::Color] {
            let Some(region) = self.result(strategy).region() else {
                continue;
            };
            let path = dir.join(format!("{}.png", strategy));
            region.save(&path).map_err(|e| PlateError::SaveRegion {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            written.push(path);
        }
        Ok(written)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            shape_label: self.shape.label_text(),
            shape_color: self.shape.color(),
            color_label: self.color.label_text(),
            color_color: self.color.color(),
            elapsed_ms: self.elapsed.as_millis() as u64,
        }
    }
}
