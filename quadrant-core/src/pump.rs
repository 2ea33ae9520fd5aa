//! Engine tick pump
//!
//! Keeps the engine's virtual clock aligned with wall time: each cycle
//! advances the clock by a fixed quantum and runs one processing pass.
//! The pump never waits for a flush to finish; the engine's own buffer
//! handoff decides what work a cycle produces.

use crate::traits::Engine;

/// Default tick quantum in milliseconds
pub const DEFAULT_TICK_PERIOD_MS: u32 = 2;

/// Fixed-cadence driver for the engine
#[derive(Debug, Clone, Copy)]
pub struct TickPump {
    period_ms: u32,
    cycles: u32,
}

impl Default for TickPump {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD_MS)
    }
}

impl TickPump {
    /// Create a pump with the given period (clamped to at least 1 ms)
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms: if period_ms == 0 { 1 } else { period_ms },
            cycles: 0,
        }
    }

    /// Tick quantum in milliseconds
    pub const fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Cycles driven so far
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Run one cycle: advance the clock, then process
    pub fn cycle<E: Engine>(&mut self, engine: &mut E) {
        engine.tick(self.period_ms);
        engine.process();
        self.cycles = self.cycles.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingEngine {
        clock_ms: u64,
        processed: u32,
    }

    impl Engine for CountingEngine {
        fn tick(&mut self, elapsed_ms: u32) {
            self.clock_ms += elapsed_ms as u64;
        }

        fn process(&mut self) {
            self.processed += 1;
        }
    }

    #[test]
    fn test_clock_advances_by_fixed_quantum() {
        let mut pump = TickPump::new(2);
        let mut engine = CountingEngine::default();

        for _ in 0..500 {
            pump.cycle(&mut engine);
        }

        assert_eq!(engine.clock_ms, 1000);
        assert_eq!(engine.processed, 500);
        assert_eq!(pump.cycles(), 500);
    }

    #[test]
    fn test_zero_period_clamps_to_one() {
        let pump = TickPump::new(0);
        assert_eq!(pump.period_ms(), 1);
    }
}
