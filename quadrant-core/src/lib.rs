//! Board-agnostic core logic for the Quadrant display firmware
//!
//! This crate contains all pipeline logic that does not depend on
//! specific hardware implementations:
//!
//! - Coordinate frames and the four-orientation rotation transform
//! - Display flush pipeline (software rotation + window writes)
//! - Touch sample to pointer event mapping
//! - Double draw-buffer ownership tracking
//! - Engine tick pump
//! - Hardware abstraction traits (display sink, touch source, engine)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod flush;
pub mod frame;
pub mod pump;
pub mod touch;
pub mod traits;
