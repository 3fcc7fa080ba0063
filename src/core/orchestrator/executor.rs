//! Orchestrator execution implementation.

use super::types::{
    LaunchOrder, OrchestrationOutcome, OrchestratorConfig, Strategy, StrategyTimings,
};
use crate::core::recognizer::{
    decode_image, HeuristicRecognizer, PlateRecognizer, PreparedInputs, RawImage, TaskResult,
};
use crate::core::task::TaskHandle;
use crate::error::{PlateError, RecognizerError, TaskError};
use crate::events::{null_sender, Event, EventSender, OrchestrationState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

type StrategyHandle = TaskHandle<(TaskResult, Duration), RecognizerError>;

/// Builder for the orchestrator
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    recognizer: Option<Arc<dyn PlateRecognizer>>,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            recognizer: None,
        }
    }

    /// Set the recognition engine shared by both strategies
    pub fn recognizer(mut self, recognizer: Arc<dyn PlateRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Bound the concurrent phase; `None` waits indefinitely
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Choose which strategy thread is spawned first
    pub fn launch_order(mut self, order: LaunchOrder) -> Self {
        self.config.launch_order = order;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator
    pub fn build(self) -> Orchestrator {
        Orchestrator {
            config: self.config,
            recognizer: self
                .recognizer
                .unwrap_or_else(|| Arc::new(HeuristicRecognizer::default())),
        }
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the shape and color strategies concurrently over one image
pub struct Orchestrator {
    config: OrchestratorConfig,
    recognizer: Arc<dyn PlateRecognizer>,
}

impl Orchestrator {
    /// Create a new orchestrator builder
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run both strategies over the image at `path`
    pub fn run(&self, path: &Path) -> Result<OrchestrationOutcome, PlateError> {
        self.run_with_events(path, &null_sender())
    }

    /// Run both strategies over the image at `path`, reporting progress
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn run_with_events(
        &self,
        path: &Path,
        events: &EventSender,
    ) -> Result<OrchestrationOutcome, PlateError> {
        let run_id = Uuid::new_v4();
        events.send(Event::Started {
            run_id,
            image_path: path.to_path_buf(),
        });

        let result = self.load(path).and_then(|image| {
            self.execute(run_id, path.to_path_buf(), &image, events)
        });
        self.finish(result, events)
    }

    /// Run both strategies over an image that is already decoded.
    ///
    /// `label` is recorded as the outcome's image path.
    pub fn run_image(
        &self,
        label: impl Into<PathBuf>,
        image: &RawImage,
        events: &EventSender,
    ) -> Result<OrchestrationOutcome, PlateError> {
        let run_id = Uuid::new_v4();
        let image_path = label.into();
        events.send(Event::Started {
            run_id,
            image_path: image_path.clone(),
        });

        let result = self.execute(run_id, image_path, image, events);
        self.finish(result, events)
    }

    fn load(&self, path: &Path) -> Result<RawImage, PlateError> {
        if !path.is_file() {
            return Err(PlateError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let image = decode_image(path)?;
        debug!(width = image.width(), height = image.height(), "Decoded image");
        Ok(image)
    }

    fn execute(
        &self,
        run_id: Uuid,
        image_path: PathBuf,
        image: &RawImage,
        events: &EventSender,
    ) -> Result<OrchestrationOutcome, PlateError> {
        let inputs = self
            .recognizer
            .preprocess(image)
            .map_err(|e| PlateError::Preprocess {
                reason: e.to_string(),
            })?;
        events.send(Event::StateChanged {
            state: OrchestrationState::PreProcessed,
        });

        events.send(Event::StateChanged {
            state: OrchestrationState::Running,
        });

        let start = Instant::now();
        let deadline = self.config.timeout.map(|timeout| start + timeout);

        let (shape_handle, color_handle) = match self.config.launch_order {
            LaunchOrder::ShapeFirst => {
                let shape = self.launch(Strategy::Shape, &inputs, events)?;
                let color = self.launch(Strategy::Color, &inputs, events)?;
                (shape, color)
            }
            LaunchOrder::ColorFirst => {
                let color = self.launch(Strategy::Color, &inputs, events)?;
                let shape = self.launch(Strategy::Shape, &inputs, events)?;
                (shape, color)
            }
        };

        // Always wait for both, even if the first one failed
        let shape = self.join(Strategy::Shape, shape_handle, deadline);
        let color = self.join(Strategy::Color, color_handle, deadline);
        let elapsed = start.elapsed();

        events.send(Event::StateChanged {
            state: OrchestrationState::Joined,
        });

        let ((shape, shape_time), (color, color_time)) = match (shape, color) {
            (Ok(shape), Ok(color)) => (shape, color),
            (Err(error), color) => {
                if let Err(other) = color {
                    warn!(error = %other, "Color strategy also failed");
                }
                return Err(error);
            }
            (Ok(_), Err(error)) => return Err(error),
        };

        let timings = StrategyTimings {
            shape: shape_time,
            color: color_time,
        };

        info!(
            elapsed_ms = elapsed.as_millis() as u64,
            sequential_ms = timings.sequential().as_millis() as u64,
            shape = %shape.label_text(),
            color = %color.label_text(),
            "Both strategies finished"
        );

        Ok(OrchestrationOutcome::new(
            run_id, image_path, shape, color, elapsed, timings,
        ))
    }

    fn launch(
        &self,
        strategy: Strategy,
        inputs: &PreparedInputs,
        events: &EventSender,
    ) -> Result<StrategyHandle, PlateError> {
        let recognizer = Arc::clone(&self.recognizer);
        let inputs = inputs.clone();
        let worker_events = events.clone();

        // Announced before the spawn so it always precedes StrategyFinished
        events.send(Event::StrategyStarted { strategy });

        let handle = TaskHandle::start(strategy.thread_name(), move || {
            let started = Instant::now();
            let result = match strategy {
                Strategy::Shape => {
                    recognizer.recognize_by_shape(&inputs.prepared, &inputs.original)
                }
                Strategy::Color => {
                    recognizer.recognize_by_color(&inputs.original, &inputs.prepared)
                }
            };
            let duration = started.elapsed();

            worker_events.send(Event::StrategyFinished {
                strategy,
                duration_ms: duration.as_millis() as u64,
                succeeded: result.is_ok(),
            });

            result.map(|task_result| (task_result, duration))
        })
        .map_err(|cause| PlateError::Strategy { strategy, cause })?;

        Ok(handle)
    }

    fn join(
        &self,
        strategy: Strategy,
        handle: StrategyHandle,
        deadline: Option<Instant>,
    ) -> Result<(TaskResult, Duration), PlateError> {
        let joined = match deadline {
            Some(deadline) => handle.join_until(deadline),
            None => handle.join(),
        };

        joined.map_err(|cause| match cause {
            TaskError::TimedOut { .. } => PlateError::StrategyTimeout {
                strategy,
                timeout: self.config.timeout.unwrap_or_default(),
            },
            cause => PlateError::Strategy { strategy, cause },
        })
    }

    fn finish(
        &self,
        result: Result<OrchestrationOutcome, PlateError>,
        events: &EventSender,
    ) -> Result<OrchestrationOutcome, PlateError> {
        match &result {
            Ok(outcome) => {
                events.send(Event::StateChanged {
                    state: OrchestrationState::Completed,
                });
                events.send(Event::Completed {
                    summary: outcome.summary(),
                });
            }
            Err(error) => {
                warn!(stage = error.stage(), %error, "Orchestration failed");
                events.send(Event::StateChanged {
                    state: OrchestrationState::Failed,
                });
                events.send(Event::Failed {
                    stage: error.stage().to_string(),
                    message: error.to_string(),
                });
            }
        }
        result
    }
}
