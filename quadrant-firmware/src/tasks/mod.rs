//! Embassy async tasks
//!
//! Two long-running tasks: the render/input loop and the sensor
//! poller. Tasks cannot be generic, so the concrete peripheral types
//! are fixed here as aliases.

pub mod gui;
pub mod sensors;

use embassy_rp::gpio::Output;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, I2C1, SPI0};
use embassy_rp::spi::{self, Spi};

use quadrant_drivers::display::St7789;
use quadrant_drivers::touch::Gt911Touch;

use crate::ui::UiEngine;

/// SPI bus wired to the panel
pub type PanelSpi = Spi<'static, SPI0, spi::Blocking>;
/// The display sink used by the flush pipeline
pub type PanelSink = St7789<PanelSpi, Output<'static>, Output<'static>>;
/// I2C bus wired to the touch controller
pub type TouchBus = I2c<'static, I2C0, i2c::Blocking>;
/// The touch source polled by the engine
pub type PanelTouch = Gt911Touch<TouchBus>;
/// I2C bus shared by the RTC, IMU and expander
pub type SensorBus = I2c<'static, I2C1, i2c::Blocking>;
/// The fully wired engine
pub type Ui = UiEngine<PanelSink, PanelTouch>;

pub use gui::gui_task;
pub use sensors::{sensors_task, BatteryAdc};
