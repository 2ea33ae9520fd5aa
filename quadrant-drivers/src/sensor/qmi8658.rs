//! QMI8658 six-axis IMU (I2C)
//!
//! Accelerometer plus gyroscope. Configured once at bring-up for a
//! fixed full-scale range and output data rate, then polled for raw
//! axis samples on the sensor cadence. Conversion to physical units is
//! integer-only.

use embedded_hal::i2c::I2c;

use super::SensorError;

/// I2C address with SA0 low
pub const DEFAULT_ADDR: u8 = 0x6B;

/// Expected WHO_AM_I readback
pub const CHIP_ID: u8 = 0x05;

/// QMI8658 register addresses
pub mod reg {
    /// Chip identification
    pub const WHO_AM_I: u8 = 0x00;
    /// Serial interface and sensor enable
    pub const CTRL1: u8 = 0x02;
    /// Accelerometer range and output rate
    pub const CTRL2: u8 = 0x03;
    /// Gyroscope range and output rate
    pub const CTRL3: u8 = 0x04;
    /// Sensor enable flags
    pub const CTRL7: u8 = 0x08;
    /// Accelerometer X low byte; six data bytes follow
    pub const AX_L: u8 = 0x35;
    /// Gyroscope X low byte; six data bytes follow
    pub const GX_L: u8 = 0x3B;
}

/// CTRL1: address auto-increment for burst reads
const CTRL1_AUTO_INC: u8 = 0x40;
/// CTRL2: accelerometer +/-4g, 250 Hz
const CTRL2_ACC_4G_250HZ: u8 = 0x15;
/// CTRL3: gyroscope +/-512 dps, 250 Hz
const CTRL3_GYR_512DPS_250HZ: u8 = 0x55;
/// CTRL7: enable accelerometer and gyroscope
const CTRL7_ACC_GYR_EN: u8 = 0x03;

/// Accelerometer sensitivity at +/-4g, LSB per g
const ACC_LSB_PER_G: i32 = 8192;

/// One raw six-axis sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

impl MotionSample {
    /// Accelerometer axis in milli-g at the configured +/-4g range
    pub const fn accel_mg(raw: i16) -> i32 {
        raw as i32 * 1000 / ACC_LSB_PER_G
    }
}

/// QMI8658 driver owning its I2C bus handle
pub struct Qmi8658<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> Qmi8658<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            addr: DEFAULT_ADDR,
        }
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.addr, &[reg], buf)
            .map_err(|_| SensorError::Bus)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.addr, &[reg, value])
            .map_err(|_| SensorError::Bus)
    }

    /// Verify the chip ID and configure both sensors
    pub fn init(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8];
        self.read_regs(reg::WHO_AM_I, &mut id)?;
        if id[0] != CHIP_ID {
            return Err(SensorError::WrongChip);
        }

        self.write_reg(reg::CTRL1, CTRL1_AUTO_INC)?;
        self.write_reg(reg::CTRL2, CTRL2_ACC_4G_250HZ)?;
        self.write_reg(reg::CTRL3, CTRL3_GYR_512DPS_250HZ)?;
        self.write_reg(reg::CTRL7, CTRL7_ACC_GYR_EN)?;
        Ok(())
    }

    /// Read one accelerometer + gyroscope sample
    pub fn read_motion(&mut self) -> Result<MotionSample, SensorError> {
        let mut raw = [0u8; 12];
        self.read_regs(reg::AX_L, &mut raw)?;

        let axis = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);
        Ok(MotionSample {
            ax: axis(0),
            ay: axis(2),
            az: axis(4),
            gx: axis(6),
            gy: axis(8),
            gz: axis(10),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accel_mg_conversion() {
        // 1g at +/-4g range reads 8192 LSB
        assert_eq!(MotionSample::accel_mg(8192), 1000);
        assert_eq!(MotionSample::accel_mg(-8192), -1000);
        assert_eq!(MotionSample::accel_mg(4096), 500);
        assert_eq!(MotionSample::accel_mg(0), 0);
    }
}
