//! # Core Module
//!
//! The terminal-agnostic recognition orchestration engine.
//!
//! ## Modules
//! - `recognizer` - Result types and the recognition engine interface
//! - `task` - Runs a blocking call on its own thread and joins its result
//! - `orchestrator` - Runs both strategies concurrently and merges results
//! - `encoder` - Formats outcomes for machines and humans

pub mod encoder;
pub mod orchestrator;
pub mod recognizer;
pub mod task;

// Re-export commonly used types
pub use orchestrator::{OrchestrationOutcome, Orchestrator, Strategy};
pub use recognizer::{PlateColor, PlateRecognizer, TaskResult};
pub use task::TaskHandle;
