//! Render and input loop
//!
//! Single task owning the engine, the draw buffers and the panel.
//! Every tick period it runs one pump cycle: advance the engine clock,
//! then process, which polls input, drains sensor updates and flushes
//! dirty bands synchronously. Nothing here waits on a flush; a slow
//! frame just means the next ticks arrive late and the clock catches
//! up in fixed quanta.

use defmt::*;
use embassy_time::{Duration, Ticker};

use quadrant_core::pump::TickPump;

use super::Ui;

#[embassy_executor::task]
pub async fn gui_task(mut engine: Ui, period_ms: u32) {
    info!("gui task started, tick period {} ms", period_ms);

    let mut pump = TickPump::new(period_ms);
    let mut ticker = Ticker::every(Duration::from_millis(pump.period_ms() as u64));

    loop {
        ticker.next().await;
        pump.cycle(&mut engine);

        // Periodic health note; dropped frames are absorbed per-frame
        if pump.cycles() % 30_000 == 0 {
            trace!("gui alive, {} frames dropped", engine.dropped_frames());
        }
    }
}
