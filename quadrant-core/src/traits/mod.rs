//! Hardware and engine abstraction traits
//!
//! These are the seams between the core pipeline and its external
//! collaborators: the panel hardware, the touch controller and the
//! rendering engine. Bring-up injects concrete implementations; the
//! original's function-pointer callbacks become trait objects here.

pub mod display;
pub mod engine;
pub mod touch;

pub use display::{DisplaySink, SinkError};
pub use engine::Engine;
pub use touch::TouchSource;
