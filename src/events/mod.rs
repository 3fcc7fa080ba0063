//! # Events Module
//!
//! Progress reporting for orchestration runs.
//!
//! ## Design
//! The orchestrator and its two worker threads emit events through a
//! channel, so a presentation layer can show progress without the core
//! knowing about terminals.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::StrategyFinished { strategy, duration_ms, .. } = event {
//!             println!("{} finished in {}ms", strategy, duration_ms);
//!         }
//!     }
//! });
//!
//! orchestrator.run_with_events(path, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
