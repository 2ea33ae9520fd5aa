//! Quadrant - rotating touch-display firmware
//!
//! Main firmware binary for the RP2040-based handheld: a 240x320
//! ST7789 panel and GT911 touch controller kept consistent across the
//! four display orientations, with a small sensor suite feeding the
//! status screen.
//!
//! Named for the four quadrant orientations (0/90/180/270 degrees).

#![no_std]
#![no_main]

extern crate alloc;

use alloc::vec::Vec;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Timer};
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use quadrant_core::buffer::DrawBufferPool;
use quadrant_core::flush::{ColorFormat, FlushPipeline};
use quadrant_core::frame::PanelGeometry;
use quadrant_core::touch::TouchMapper;
use quadrant_drivers::display::St7789;
use quadrant_drivers::expander::Tca9554;
use quadrant_drivers::sensor::battery::BatteryMonitor;
use quadrant_drivers::sensor::pcf85063::Pcf85063;
use quadrant_drivers::sensor::qmi8658::Qmi8658;
use quadrant_drivers::storage::SdCard;
use quadrant_drivers::touch::Gt911Touch;

use crate::config::{parse_config, DeviceConfig};
use crate::tasks::BatteryAdc;
use crate::ui::UiEngine;

mod channels;
mod config;
mod tasks;
mod ui;

// Heap allocator for the pixel buffers
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Large enough for the rotation scratch plus both partial buffers at
// the default divisor, with headroom for smaller divisors trimmed out
const HEAP_SIZE: usize = 208 * 1024;

/// Embedded device configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

/// Expander pin driving the backlight enable line
const BACKLIGHT_PIN: u8 = 2;

/// Main entry point
///
/// Bring-up is a strict ordered sequence; each numbered step below
/// depends on the ones before it. Display-path failures are fatal,
/// everything else degrades with a warning.
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Quadrant firmware starting...");

    init_heap();
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    channels::set_rotation(config.display.rotation);
    let mut delay = Delay;

    // 1. Battery sense ADC (VSYS divider on GPIO29)
    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let vsys = adc::Channel::new_pin(p.PIN_29, Pull::None);
    let battery = BatteryMonitor::new(BatteryAdc::new(adc, vsys), 3300, (3, 1));
    info!("Battery ADC initialized");

    // 2. I2C buses: touch alone on I2C0; RTC + IMU + expander on I2C1
    let touch_bus = I2c::new_blocking(p.I2C0, p.PIN_9, p.PIN_8, i2c::Config::default());
    let mut sensor_bus = I2c::new_blocking(p.I2C1, p.PIN_15, p.PIN_14, i2c::Config::default());
    info!("I2C buses initialized");

    // 3. RTC
    let rtc_ok = match Pcf85063::new(&mut sensor_bus).init() {
        Ok(()) => true,
        Err(e) => {
            warn!("RTC unavailable: {}, continuing without wall clock", e);
            false
        }
    };

    // 4. IMU
    let imu_ok = match Qmi8658::new(&mut sensor_bus).init() {
        Ok(()) => true,
        Err(e) => {
            warn!("IMU unavailable: {}, continuing without motion", e);
            false
        }
    };

    // 5. I/O expander and backlight
    {
        let mut expander = Tca9554::new(&mut sensor_bus);
        let lit = config.backlight_level > 0;
        let result = expander
            .set_direction(0x00)
            .and_then(|()| expander.set_pin(BACKLIGHT_PIN, lit));
        match result {
            Ok(()) => info!("Backlight {}", if lit { "on" } else { "off" }),
            Err(e) => warn!("Expander unavailable: {}, backlight uncontrolled", e),
        }
    }

    // 6. Panel bring-up. Fatal: nothing can be shown without it.
    let spi_config = {
        let mut c = spi::Config::default();
        c.frequency = 62_500_000;
        c
    };
    let panel_spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_2, p.PIN_3, spi_config);
    // Panel is the only SPI0 device; hold its select permanently
    let _lcd_cs = Output::new(p.PIN_5, Level::Low);
    let dc = Output::new(p.PIN_6, Level::Low);
    let rst = Output::new(p.PIN_7, Level::Low);

    let geometry = PanelGeometry::new(config.display.width, config.display.height);
    let mut panel = St7789::new(panel_spi, dc, rst, geometry);
    if let Err(e) = panel.init(&mut delay) {
        defmt::panic!("panel bring-up failed: {}", e);
    }
    info!("Panel initialized ({}x{})", geometry.width, geometry.height);

    // 7. Pixel buffers. Fatal: the render loop cannot start without
    // its full complement.
    let bpp = ColorFormat::Rgb565.bytes_per_pixel();
    let frame_bytes = geometry.area() * bpp;
    let partial_bytes = (frame_bytes / config.display.buffer_divisor as usize).max(bpp);

    let scratch = alloc_pixels(frame_bytes)
        .unwrap_or_else(|| defmt::panic!("rotation scratch allocation failed"));
    let slot_a = alloc_pixels(partial_bytes)
        .unwrap_or_else(|| defmt::panic!("draw buffer allocation failed"));
    let slot_b = alloc_pixels(partial_bytes)
        .unwrap_or_else(|| defmt::panic!("draw buffer allocation failed"));
    info!(
        "Pixel buffers allocated: scratch {} B, partials 2x{} B",
        frame_bytes, partial_bytes
    );

    // 8. SD card, strictly after the panel: re-initializing the LCD
    // glitches the shared supply rail and requires re-mounting the
    // card, so the panel must already be up when the mount happens.
    let sd_spi = Spi::new_blocking(p.SPI1, p.PIN_10, p.PIN_11, p.PIN_12, spi::Config::default());
    let sd_cs = Output::new(p.PIN_13, Level::High);
    let mut sd = SdCard::new(sd_spi, sd_cs);
    match sd.init(&mut delay) {
        Ok(()) => match sd.capacity_blocks() {
            Ok(blocks) => info!(
                "SD card mounted: {}, {} MiB",
                sd.card_type(),
                blocks / 2048
            ),
            Err(_) => info!("SD card mounted: {}, capacity unknown", sd.card_type()),
        },
        Err(e) => warn!("SD card unavailable: {}, continuing without storage", e),
    }

    // 9. Engine wiring: pool, pipeline, mapper, touch
    let pool = DrawBufferPool::new(slot_a, slot_b)
        .unwrap_or_else(|_| defmt::panic!("draw buffer pool misconfigured"));
    let pipeline = FlushPipeline::new(panel, geometry, ColorFormat::Rgb565, scratch)
        .unwrap_or_else(|_| defmt::panic!("rotation scratch undersized"));
    let mapper = TouchMapper::new(geometry);

    let mut touch = Gt911Touch::new(touch_bus);
    if let Err(e) = touch.init() {
        warn!("Touch unavailable: {}, continuing without input", e);
    }

    // 10. UI with an initial full-screen dirty region
    let engine = UiEngine::new(pool, pipeline, mapper, touch, config.input_poll_ms);
    info!("Engine initialized, rotation {}", config.display.rotation);

    // Sensors first so the first frames already have data to show
    spawner
        .spawn(tasks::sensors_task(
            sensor_bus,
            battery,
            imu_ok,
            rtc_ok,
            config.sensor_poll_ms,
        ))
        .unwrap();
    spawner
        .spawn(tasks::gui_task(engine, config.tick_period_ms))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            // build.rs validates device.toml, so this only happens if
            // the two parsers disagree
            error!("Embedded config invalid: {}, using defaults", e);
            DeviceConfig::default()
        }
    }
}

/// Allocate a zeroed pixel buffer that lives for the process
///
/// Uses a fallible reserve so an undersized heap fails cleanly at
/// bring-up instead of aborting inside the render loop.
fn alloc_pixels(len: usize) -> Option<&'static mut [u8]> {
    let mut v: Vec<u8> = Vec::new();
    v.try_reserve_exact(len).ok()?;
    v.resize(len, 0);
    Some(v.leak())
}
