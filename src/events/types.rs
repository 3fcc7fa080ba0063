//! Event type definitions for run reporting.

use crate::core::orchestrator::Strategy;
use crate::core::recognizer::PlateColor;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// All events emitted during an orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A run has started
    Started { run_id: Uuid, image_path: PathBuf },
    /// The run moved to a new state
    StateChanged { state: OrchestrationState },
    /// A strategy thread was launched
    StrategyStarted { strategy: Strategy },
    /// A strategy thread returned, successfully or not
    StrategyFinished {
        strategy: Strategy,
        duration_ms: u64,
        succeeded: bool,
    },
    /// The run produced an outcome
    Completed { summary: RunSummary },
    /// The run failed
    Failed { stage: String, message: String },
}

/// Lifecycle of one orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestrationState {
    NotStarted,
    PreProcessed,
    Running,
    Joined,
    Completed,
    Failed,
}

impl OrchestrationState {
    /// Whether the run can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestrationState::Completed | OrchestrationState::Failed)
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub shape_label: String,
    pub shape_color: PlateColor,
    pub color_label: String,
    pub color_color: PlateColor,
    /// Wall-clock duration of the concurrent phase
    pub elapsed_ms: u64,
}

impl std::fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestrationState::NotStarted => write!(f, "Not started"),
            OrchestrationState::PreProcessed => write!(f, "Pre-processed"),
            OrchestrationState::Running => write!(f, "Running strategies"),
            OrchestrationState::Joined => write!(f, "Joined"),
            OrchestrationState::Completed => write!(f, "Completed"),
            OrchestrationState::Failed => write!(f, "Failed"),
        }
    }
}
