//! # Task Module
//!
//! Runs one blocking call on its own OS thread and hands back everything it
//! returned on join.
//!
//! ## Guarantees
//! - `start` spawns immediately and never blocks the caller
//! - `join` returns exactly the callable's value, or a [`TaskError`]
//! - errors and panics surface through `join`; nothing is replaced by defaults
//! - no cancellation: a timed-out task is detached, not stopped
//!
//! [`TaskError`]: crate::error::TaskError

mod handle;

pub use handle::TaskHandle;
