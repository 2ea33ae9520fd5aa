//! GT911 capacitive touch controller (I2C)
//!
//! Reports up to five contact points in the panel's native frame. The
//! controller latches a sample into its point registers and raises a
//! buffer-ready flag; the host reads the points and clears the flag to
//! arm the next sample.
//!
//! Register addresses are 16-bit, sent big-endian before each access.

use embedded_hal::i2c::I2c;

use quadrant_core::touch::{TouchPoint, TouchSample, MAX_TOUCH_POINTS};
use quadrant_core::traits::TouchSource;

/// Default I2C address (INT low during reset)
pub const DEFAULT_ADDR: u8 = 0x5D;

/// GT911 register addresses
pub mod reg {
    /// Product ID, 4 ASCII bytes ("911\0")
    pub const PRODUCT_ID: u16 = 0x8140;
    /// Status: bit 7 buffer ready, bits 0-3 touch count
    pub const STATUS: u16 = 0x814E;
    /// First point record; 8 bytes per point, 5 points
    pub const POINTS: u16 = 0x814F;
}

/// Buffer-ready flag in the status register
const STATUS_READY: u8 = 0x80;
/// Touch count mask in the status register
const STATUS_COUNT_MASK: u8 = 0x0F;

/// Bytes per point record: id, x lo/hi, y lo/hi, size lo/hi, reserved
const POINT_LEN: usize = 8;

/// Decode a block of point records into a sample
///
/// `count` comes from the status register; anything past
/// [`MAX_TOUCH_POINTS`] or past the supplied buffer is ignored.
pub fn decode_points(raw: &[u8], count: usize) -> TouchSample {
    let mut sample = TouchSample::released();
    let n = count.min(MAX_TOUCH_POINTS).min(raw.len() / POINT_LEN);

    for i in 0..n {
        let rec = &raw[i * POINT_LEN..(i + 1) * POINT_LEN];
        let point = TouchPoint {
            x: u16::from_le_bytes([rec[1], rec[2]]),
            y: u16::from_le_bytes([rec[3], rec[4]]),
            strength: u16::from_le_bytes([rec[5], rec[6]]),
        };
        // Vec capacity equals MAX_TOUCH_POINTS; n is clamped above
        let _ = sample.points.push(point);
    }

    sample.pressed = !sample.points.is_empty();
    sample
}

/// Errors from controller probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchError {
    /// I2C transfer failed
    Bus,
    /// Product ID did not read back as a GT911
    WrongChip,
}

/// GT911 driver owning its I2C bus handle
///
/// Bus errors during polling are absorbed: the last good sample is
/// kept for a missed poll and a released sample replaces it once the
/// error persists, so the render loop never sees a fault.
pub struct Gt911Touch<I2C> {
    i2c: I2C,
    addr: u8,
    last: TouchSample,
}

impl<I2C: I2c> Gt911Touch<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            addr: DEFAULT_ADDR,
            last: TouchSample::released(),
        }
    }

    pub fn with_addr(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            last: TouchSample::released(),
        }
    }

    fn read_regs(&mut self, reg: u16, buf: &mut [u8]) -> Result<(), TouchError> {
        self.i2c
            .write_read(self.addr, &reg.to_be_bytes(), buf)
            .map_err(|_| TouchError::Bus)
    }

    fn write_reg(&mut self, reg: u16, value: u8) -> Result<(), TouchError> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c
            .write(self.addr, &[hi, lo, value])
            .map_err(|_| TouchError::Bus)
    }

    /// Probe the controller and verify the product ID
    pub fn init(&mut self) -> Result<(), TouchError> {
        let mut id = [0u8; 4];
        self.read_regs(reg::PRODUCT_ID, &mut id)?;
        if &id[..3] != b"911" {
            return Err(TouchError::WrongChip);
        }
        // Clear any stale sample left from before reset
        self.write_reg(reg::STATUS, 0)?;
        Ok(())
    }

    /// Poll the controller for a new sample
    ///
    /// Returns `None` when no new sample is latched.
    fn poll(&mut self) -> Result<Option<TouchSample>, TouchError> {
        let mut status = [0u8];
        self.read_regs(reg::STATUS, &mut status)?;
        if status[0] & STATUS_READY == 0 {
            return Ok(None);
        }

        let count = (status[0] & STATUS_COUNT_MASK) as usize;
        let mut raw = [0u8; POINT_LEN * MAX_TOUCH_POINTS];
        let sample = if count == 0 {
            TouchSample::released()
        } else {
            let take = count.min(MAX_TOUCH_POINTS);
            self.read_regs(reg::POINTS, &mut raw[..take * POINT_LEN])?;
            decode_points(&raw[..take * POINT_LEN], take)
        };

        // Re-arm the controller for the next sample
        self.write_reg(reg::STATUS, 0)?;
        Ok(Some(sample))
    }
}

impl<I2C: I2c> TouchSource for Gt911Touch<I2C> {
    fn read_raw_sample(&mut self) -> TouchSample {
        match self.poll() {
            Ok(Some(sample)) => {
                self.last = sample.clone();
                sample
            }
            // No new sample latched; the finger state is unchanged
            Ok(None) => self.last.clone(),
            Err(_) => {
                self.last = TouchSample::released();
                self.last.clone()
            }
        }
    }
}
