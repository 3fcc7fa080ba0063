//! # Orchestrator Module
//!
//! Runs the shape and color strategies over one image at the same time and
//! merges their results.
//!
//! ## Run Stages
//! 1. **Load** - check the path and decode the image
//! 2. **Pre-process** - one pass, shared read-only by both strategies
//! 3. **Run** - one OS thread per strategy
//! 4. **Join** - wait for both, optionally against a shared deadline
//! 5. **Merge** - shape result first, color result second
//!
//! ## Failure Policy
//! A run either yields both results or fails as a whole. The failing
//! strategy is named in the error; there is no partial success and no retry.

mod executor;
mod types;

pub use executor::{Orchestrator, OrchestratorBuilder};
pub use types::{
    LaunchOrder, OrchestrationOutcome, OrchestratorConfig, Strategy, StrategyTimings,
};
