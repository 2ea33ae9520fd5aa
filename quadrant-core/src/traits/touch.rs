//! Touch controller trait

use crate::touch::TouchSample;

/// Source of raw touch samples
///
/// Polled once per input-read invocation. There is no backpressure:
/// implementations return immediately with the current or last-known
/// sample, and absorb bus errors into a released sample rather than
/// surfacing them to the render loop.
pub trait TouchSource {
    /// Read the current raw sample from the controller
    fn read_raw_sample(&mut self) -> TouchSample;
}
