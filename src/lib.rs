//! # Plate Duo
//!
//! Runs two license-plate recognition strategies over one image at the same
//! time and reconciles their results.
//!
//! ## Core Guarantees
//! - **Both or nothing** - an outcome always carries the shape and the color result
//! - **Failures are tagged** - a broken strategy is reported by name, never as an empty result
//! - **One pre-processing pass** - both strategies read the same prepared inputs
//!
//! ## Architecture
//! The library is split into a terminal-agnostic core and presentation layers:
//! - `core` - Recognizer interface, task runner, orchestrator and encoders
//! - `events` - Event-driven progress reporting
//! - `error` - Tagged error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{PlateError, Result};

/// Initialize tracing for the library.
///
/// Logs go to stderr so stdout stays free for result lines. `RUST_LOG`
/// overrides `default_directive`.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber installed earlier (e.g. by a host application) wins
    let _ = tracing::subscriber::set_global_default(subscriber);
}
