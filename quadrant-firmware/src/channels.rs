//! Shared state between Embassy tasks
//!
//! The rotation is a plain atomic: the flush and touch paths each read
//! it exactly once per operation, so the two sides of one frame or one
//! sample always agree even if the value changes between operations.
//!
//! Sensor readings are published through signals; the UI drains them
//! with `try_take` on its own cadence and keeps the last seen value.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU8, Ordering};

use quadrant_core::frame::Rotation;
use quadrant_drivers::sensor::pcf85063::DateTime;
use quadrant_drivers::sensor::qmi8658::MotionSample;

/// Current display orientation, shared by the render and touch paths
static ROTATION: AtomicU8 = AtomicU8::new(0);

/// Read the current orientation
pub fn rotation() -> Rotation {
    Rotation::from_raw(ROTATION.load(Ordering::Relaxed))
}

/// Publish a new orientation; applies from the next flush/sample on
pub fn set_rotation(rotation: Rotation) {
    ROTATION.store(rotation.as_raw(), Ordering::Relaxed);
}

/// Battery voltage in millivolts (updated by the sensor task)
pub static BATTERY_MV: Signal<CriticalSectionRawMutex, u16> = Signal::new();

/// Latest IMU sample (updated by the sensor task)
pub static ACCEL: Signal<CriticalSectionRawMutex, MotionSample> = Signal::new();

/// Wall clock reading, `None` while the RTC is invalid or absent
pub static WALL_CLOCK: Signal<CriticalSectionRawMutex, Option<DateTime>> = Signal::new();
