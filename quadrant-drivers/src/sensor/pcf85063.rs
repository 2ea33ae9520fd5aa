//! PCF85063 real-time clock (I2C)
//!
//! Battery-backed wall clock. Time registers are BCD-coded; the
//! seconds register carries an oscillator-stop flag that marks the
//! reading as untrustworthy after a power loss until the clock is set
//! again.

use embedded_hal::i2c::I2c;

use super::SensorError;

/// Fixed I2C address
pub const ADDR: u8 = 0x51;

/// PCF85063 register addresses
pub mod reg {
    /// Control 1: stop bit, 12/24h mode
    pub const CONTROL_1: u8 = 0x00;
    /// Seconds (BCD); bit 7 is the oscillator-stop flag
    pub const SECONDS: u8 = 0x04;
}

/// Oscillator-stop flag in the seconds register
const OS_FLAG: u8 = 0x80;

/// Encode a binary value 0-99 as BCD
pub const fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Decode a BCD byte to binary
pub const fn from_bcd(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Calendar date and time as kept by the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Full year, 2000-2099
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// PCF85063 driver owning its I2C bus handle
pub struct Pcf85063<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Pcf85063<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Put the clock in 24-hour mode and make sure it is running
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.i2c
            .write(ADDR, &[reg::CONTROL_1, 0x00])
            .map_err(|_| SensorError::Bus)
    }

    /// Read the current date and time
    ///
    /// Fails with [`SensorError::Invalid`] when the oscillator-stop
    /// flag is set: the clock lost backup power and holds garbage until
    /// [`Self::set_datetime`] is called.
    pub fn read_datetime(&mut self) -> Result<DateTime, SensorError> {
        let mut raw = [0u8; 7];
        self.i2c
            .write_read(ADDR, &[reg::SECONDS], &mut raw)
            .map_err(|_| SensorError::Bus)?;

        if raw[0] & OS_FLAG != 0 {
            return Err(SensorError::Invalid);
        }

        Ok(DateTime {
            second: from_bcd(raw[0] & 0x7F),
            minute: from_bcd(raw[1] & 0x7F),
            hour: from_bcd(raw[2] & 0x3F),
            day: from_bcd(raw[3] & 0x3F),
            // raw[4] is the weekday; derived from the date when needed
            month: from_bcd(raw[5] & 0x1F),
            year: 2000 + from_bcd(raw[6]) as u16,
        })
    }

    /// Set the clock, clearing the oscillator-stop flag
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), SensorError> {
        let buf = [
            reg::SECONDS,
            to_bcd(dt.second),
            to_bcd(dt.minute),
            to_bcd(dt.hour),
            to_bcd(dt.day),
            0, // weekday unused
            to_bcd(dt.month),
            to_bcd((dt.year - 2000) as u8),
        ];
        self.i2c.write(ADDR, &buf).map_err(|_| SensorError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_round_trip() {
        for v in 0..=99u8 {
            assert_eq!(from_bcd(to_bcd(v)), v);
        }
    }

    #[test]
    fn test_bcd_known_values() {
        assert_eq!(to_bcd(59), 0x59);
        assert_eq!(to_bcd(0), 0x00);
        assert_eq!(from_bcd(0x23), 23);
    }
}
