//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in quadrant-core for the handheld's peripherals:
//!
//! - Display controller (ST7789 over SPI)
//! - Touch controller (GT911 over I2C)
//! - Sensors (QMI8658 IMU, PCF85063 RTC, battery gauge)
//! - I/O expander (TCA9554)
//! - Storage (SD card in SPI mode)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod display;
pub mod expander;
pub mod sensor;
pub mod storage;
pub mod touch;
