//! # Recognizer Module
//!
//! The recognition engine as seen by the orchestrator.
//!
//! ## Contents
//! - `types` - [`TaskResult`], [`PlateColor`] and the shared image handles
//! - `traits` - the [`PlateRecognizer`] interface and its configuration
//! - `decode` - file decoding with a zune-jpeg fast path
//! - `heuristic` - a model-free recognizer used by the CLI
//!
//! ## Sharing
//! [`PreparedImage`] and [`OriginalImage`] wrap their pixels in `Arc` and
//! expose no mutable access, so one pre-processing pass can be handed to
//! both strategy threads.

mod decode;
mod heuristic;
mod resize;
mod traits;
mod types;

pub use decode::{decode_image, ImageFormat};
pub use heuristic::{initialize_recognizer, HeuristicRecognizer};
pub use resize::downscale_to_width;
pub use traits::{PlateRecognizer, RecognizerConfig};
pub use types::{
    OriginalImage, PlateColor, PreparedImage, PreparedInputs, RawImage, RegionImage, TaskResult,
};
