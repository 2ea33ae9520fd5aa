//! Retained status UI
//!
//! The engine behind the tick pump: keeps a retained status screen
//! (clock, battery, motion), tracks the dirty region, and on each
//! processing pass polls the touch controller, drains sensor updates
//! and flushes dirty bands through the pipeline.
//!
//! A full press-then-release tap anywhere on the screen advances the
//! display orientation by 90 degrees.

pub mod partial_frame;

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use heapless::String;

use quadrant_core::buffer::{DrawBufferPool, SlotIndex};
use quadrant_core::flush::FlushPipeline;
use quadrant_core::frame::{LogicalRect, Rotation};
use quadrant_core::touch::{PointerState, TouchMapper};
use quadrant_core::traits::{DisplaySink, Engine, TouchSource};
use quadrant_drivers::sensor::battery::BatteryMonitor;
use quadrant_drivers::sensor::pcf85063::DateTime;
use quadrant_drivers::sensor::qmi8658::MotionSample;

use crate::channels;
use partial_frame::PartialFrame;

/// Rows from the top that sensor updates redraw
const STATUS_ROWS: i32 = 200;

/// Retained values shown on the status screen
struct StatusState {
    battery_mv: u16,
    accel: MotionSample,
    clock: Option<DateTime>,
}

/// The rendering engine driven by the tick pump
pub struct UiEngine<S: DisplaySink, T: TouchSource> {
    pool: DrawBufferPool<'static>,
    pipeline: FlushPipeline<'static, S>,
    mapper: TouchMapper,
    touch: T,
    state: StatusState,
    dirty: Option<LogicalRect>,
    /// Pointer was down on the previous poll
    was_pressed: bool,
    clock_ms: u32,
    next_poll_ms: u32,
    input_poll_ms: u32,
    fill_slot: SlotIndex,
}

impl<S: DisplaySink, T: TouchSource> UiEngine<S, T> {
    pub fn new(
        pool: DrawBufferPool<'static>,
        pipeline: FlushPipeline<'static, S>,
        mapper: TouchMapper,
        touch: T,
        input_poll_ms: u32,
    ) -> Self {
        let mut engine = Self {
            pool,
            pipeline,
            mapper,
            touch,
            state: StatusState {
                battery_mv: 0,
                accel: MotionSample::default(),
                clock: None,
            },
            dirty: None,
            was_pressed: false,
            clock_ms: 0,
            next_poll_ms: 0,
            input_poll_ms,
            fill_slot: SlotIndex::A,
        };
        // First frame paints the whole screen
        engine.mark_all_dirty(channels::rotation());
        engine
    }

    /// Frames dropped by the flush path so far
    pub fn dropped_frames(&self) -> u32 {
        self.pipeline.dropped_frames()
    }

    fn logical_size(&self, rotation: Rotation) -> (i32, i32) {
        let (w, h) = self.pipeline.panel().logical_resolution(rotation);
        (w as i32, h as i32)
    }

    fn mark_dirty(&mut self, area: LogicalRect) {
        self.dirty = Some(match self.dirty {
            Some(d) => LogicalRect::new(
                d.x1.min(area.x1),
                d.y1.min(area.y1),
                d.x2.max(area.x2),
                d.y2.max(area.y2),
            ),
            None => area,
        });
    }

    fn mark_all_dirty(&mut self, rotation: Rotation) {
        let (w, h) = self.logical_size(rotation);
        self.dirty = Some(LogicalRect::new(0, 0, w - 1, h - 1));
    }

    fn mark_status_dirty(&mut self, rotation: Rotation) {
        let (w, h) = self.logical_size(rotation);
        self.mark_dirty(LogicalRect::new(0, 0, w - 1, STATUS_ROWS.min(h) - 1));
    }

    /// Poll the touch controller on its own cadence
    fn poll_input(&mut self) {
        if self.clock_ms < self.next_poll_ms {
            return;
        }
        self.next_poll_ms = self.clock_ms + self.input_poll_ms;

        let sample = self.touch.read_raw_sample();
        let rotation = channels::rotation();
        let event = self.mapper.map(&sample, rotation);

        let pressed = event.state == PointerState::Pressed;
        if self.was_pressed && !pressed {
            // Completed tap: advance the orientation. The new value
            // applies from the next flush on; anything already flushed
            // this cycle used the old one consistently.
            let next = rotation.next();
            channels::set_rotation(next);
            #[cfg(feature = "defmt")]
            defmt::info!("rotation -> {}", next);
            self.mark_all_dirty(next);
        }
        self.was_pressed = pressed;
    }

    /// Pull in any sensor values published since the last pass
    fn drain_sensors(&mut self) {
        let mut changed = false;
        if let Some(mv) = channels::BATTERY_MV.try_take() {
            changed |= mv != self.state.battery_mv;
            self.state.battery_mv = mv;
        }
        if let Some(accel) = channels::ACCEL.try_take() {
            changed |= accel != self.state.accel;
            self.state.accel = accel;
        }
        if let Some(clock) = channels::WALL_CLOCK.try_take() {
            changed |= clock != self.state.clock;
            self.state.clock = clock;
        }
        if changed {
            self.mark_status_dirty(channels::rotation());
        }
    }

    /// Render and flush the dirty region, band by band
    ///
    /// Each band fits one partial draw buffer; the scene is replayed
    /// over every band with clipping doing the selection. Slots
    /// alternate so a band can be filled while the previous one is
    /// notionally in flight.
    fn flush_dirty(&mut self) {
        let Some(dirty) = self.dirty.take() else {
            return;
        };

        // One read for everything this frame touches
        let rotation = channels::rotation();
        let (w, h) = self.logical_size(rotation);
        let dirty = LogicalRect::new(
            dirty.x1.max(0),
            dirty.y1.max(0),
            dirty.x2.min(w - 1),
            dirty.y2.min(h - 1),
        );
        if !dirty.is_valid() {
            return;
        }

        let band_rows = (self.pool.slot_len() / (dirty.width() as usize * 2)).max(1) as i32;

        let mut y = dirty.y1;
        while y <= dirty.y2 {
            let band = LogicalRect::new(
                dirty.x1,
                y,
                dirty.x2,
                (y + band_rows - 1).min(dirty.y2),
            );
            self.flush_band(band, rotation);
            y = band.y2 + 1;
        }
    }

    fn flush_band(&mut self, band: LogicalRect, rotation: Rotation) {
        let slot = self.fill_slot;
        self.fill_slot = slot.other();

        let bytes = band.area() as usize * 2;
        let Ok(buf) = self.pool.grant_fill(slot) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("draw slot unavailable, band skipped");
            return;
        };
        let mut frame = PartialFrame::new(&mut buf[..bytes], band);
        let (w, h) = {
            let (w, h) = self.pipeline.panel().logical_resolution(rotation);
            (w as i32, h as i32)
        };
        draw_screen(&mut frame, &self.state, rotation, w, h);

        if self.pool.submit(slot).is_err() {
            return;
        }
        let Ok(px) = self.pool.flushable(slot) else {
            return;
        };

        let mut ready = false;
        self.pipeline
            .flush(rotation, band, &px[..bytes], || ready = true);
        if ready {
            // Completion signal returns the slot to the engine
            let _ = self.pool.release(slot);
        }
    }
}

impl<S: DisplaySink, T: TouchSource> Engine for UiEngine<S, T> {
    fn tick(&mut self, elapsed_ms: u32) {
        self.clock_ms = self.clock_ms.wrapping_add(elapsed_ms);
    }

    fn process(&mut self) {
        self.poll_input();
        self.drain_sensors();
        self.flush_dirty();
    }
}

/// Paint the whole status scene; the target clips to its band
fn draw_screen<D>(target: &mut D, state: &StatusState, rotation: Rotation, w: i32, h: i32)
where
    D: DrawTarget<Color = Rgb565, Error = core::convert::Infallible>,
{
    let background = Rectangle::new(Point::zero(), Size::new(w as u32, h as u32));
    let _ = background
        .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
        .draw(target);

    let title = MonoTextStyle::new(&FONT_10X20, Rgb565::CSS_ORANGE);
    let big = MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE);
    let small = MonoTextStyle::new(&FONT_6X10, Rgb565::CSS_LIGHT_GRAY);

    let _ = Text::new("QUADRANT", Point::new(12, 28), title).draw(target);

    let mut line: String<40> = String::new();
    match state.clock {
        Some(dt) => {
            let _ = write!(line, "{:02}:{:02}:{:02}", dt.hour, dt.minute, dt.second);
        }
        None => {
            let _ = line.push_str("--:--:--");
        }
    }
    let _ = Text::new(&line, Point::new(12, 70), big).draw(target);

    line.clear();
    if let Some(dt) = state.clock {
        let _ = write!(line, "{:04}-{:02}-{:02}", dt.year, dt.month, dt.day);
    } else {
        let _ = line.push_str("clock not set");
    }
    let _ = Text::new(&line, Point::new(12, 90), small).draw(target);

    line.clear();
    let pct = BatteryMonitor::<NoAdc>::mv_to_percent(state.battery_mv);
    let _ = write!(line, "bat {} mV  {}%", state.battery_mv, pct);
    let _ = Text::new(&line, Point::new(12, 112), small).draw(target);

    line.clear();
    let _ = write!(
        line,
        "acc {} {} {} mg",
        MotionSample::accel_mg(state.accel.ax),
        MotionSample::accel_mg(state.accel.ay),
        MotionSample::accel_mg(state.accel.az),
    );
    let _ = Text::new(&line, Point::new(12, 128), small).draw(target);

    line.clear();
    let _ = write!(line, "rot {} deg", rotation.as_raw() as u32 * 90);
    let _ = Text::new(&line, Point::new(12, 144), small).draw(target);

    let _ = Text::new("tap to rotate", Point::new(12, h - 12), small).draw(target);
}

/// Phantom ADC parameter for calling the battery percent table
struct NoAdc;
