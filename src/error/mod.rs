//! # Error Module
//!
//! Tagged failure types for plate recognition runs.
//!
//! ## Design Principles
//! - **Never hand back placeholders** - a failed strategy is an error, not an empty result
//! - **Include context** - paths, which strategy, what went wrong
//! - **Name the stage** - every fatal error knows where in the run it happened

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::core::orchestrator::Strategy;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PlateError {
    #[error("Image not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Failed to initialize recognizer: {reason}")]
    Initialization { reason: String },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Pre-processing failed: {reason}")]
    Preprocess { reason: String },

    #[error("{strategy} strategy failed: {cause}")]
    Strategy {
        strategy: Strategy,
        #[source]
        cause: TaskError<RecognizerError>,
    },

    #[error("{strategy} strategy did not finish within {}ms", .timeout.as_millis())]
    StrategyTimeout { strategy: Strategy, timeout: Duration },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to save region image {path}: {reason}")]
    SaveRegion { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlateError {
    /// The stage of the run this error belongs to, for one-line diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            PlateError::InputNotFound { .. } => "input",
            PlateError::Initialization { .. } => "initialization",
            PlateError::Decode { .. } => "decode",
            PlateError::Preprocess { .. } => "preprocess",
            PlateError::Strategy { strategy, .. }
            | PlateError::StrategyTimeout { strategy, .. } => match strategy {
                Strategy::Shape => "shape strategy",
                Strategy::Color => "color strategy",
            },
            PlateError::Output(_) | PlateError::SaveRegion { .. } => "output",
            PlateError::Config(_) => "configuration",
        }
    }

    /// The strategy responsible for this error, if any.
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            PlateError::Strategy { strategy, .. }
            | PlateError::StrategyTimeout { strategy, .. } => Some(*strategy),
            _ => None,
        }
    }
}

/// Errors raised by a recognition collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizerError {
    #[error("Invalid recognizer configuration: {0}")]
    InvalidConfig(String),

    #[error("Image is empty or has zero dimensions")]
    EmptyImage,

    #[error("Image processing failed: {0}")]
    Processing(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),
}

/// Failures observed when joining a concurrent task
#[derive(Error, Debug)]
pub enum TaskError<E>
where
    E: std::error::Error + 'static,
{
    #[error("{0}")]
    Failed(#[source] E),

    #[error("task '{task}' panicked: {message}")]
    Panicked { task: String, message: String },

    #[error("task '{task}' did not finish within {}ms", .timeout.as_millis())]
    TimedOut { task: String, timeout: Duration },

    #[error("task '{task}' exited without reporting a result")]
    Disconnected { task: String },

    #[error("failed to spawn task '{task}': {source}")]
    Spawn {
        task: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PlateError>;
