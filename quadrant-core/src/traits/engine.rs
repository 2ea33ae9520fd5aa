//! Rendering engine trait
//!
//! The engine is a black box to the core: it keeps its own virtual
//! clock and, when processed, produces zero or more flush and
//! input-read calls as side effects.

/// The rendering engine as driven by the tick pump
pub trait Engine {
    /// Advance the engine's virtual clock by `elapsed_ms`
    fn tick(&mut self, elapsed_ms: u32);

    /// Run one processing cycle
    ///
    /// May synchronously invoke the flush pipeline and touch mapper as
    /// side effects. Must not assume any previous flush has completed;
    /// ticks keep arriving regardless.
    fn process(&mut self);
}
