//! Display flush pipeline
//!
//! Consumes logical dirty rectangles plus packed pixel data from the
//! engine, rotates them into the panel's native frame when needed, and
//! forwards them to the display sink.

pub mod blit;
pub mod pipeline;

pub use blit::{rotate_pixels, ColorFormat};
pub use pipeline::{FlushPipeline, PipelineError};
