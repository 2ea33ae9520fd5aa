//! TCA9554 8-bit I2C I/O expander
//!
//! Drives the board lines that have no dedicated MCU pin, the display
//! backlight enable among them. The output register is shadowed so a
//! single-pin update does not need a read-modify-write on the bus.

use embedded_hal::i2c::I2c;

/// I2C address with all address pins low
pub const DEFAULT_ADDR: u8 = 0x20;

/// TCA9554 register addresses
pub mod reg {
    /// Input port
    pub const INPUT: u8 = 0x00;
    /// Output port
    pub const OUTPUT: u8 = 0x01;
    /// Polarity inversion
    pub const POLARITY: u8 = 0x02;
    /// Configuration: 1 = input, 0 = output
    pub const CONFIG: u8 = 0x03;
}

/// Expander errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExpanderError {
    /// I2C transfer failed
    Bus,
    /// Pin number outside 0-7
    BadPin,
}

/// TCA9554 driver owning its I2C bus handle
pub struct Tca9554<I2C> {
    i2c: I2C,
    addr: u8,
    /// Shadow of the output register
    output: u8,
}

impl<I2C: I2c> Tca9554<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            addr: DEFAULT_ADDR,
            // Power-on reset value of the output register
            output: 0xFF,
        }
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), ExpanderError> {
        self.i2c
            .write(self.addr, &[reg, value])
            .map_err(|_| ExpanderError::Bus)
    }

    /// Configure the pin direction mask (1 = input, 0 = output)
    pub fn set_direction(&mut self, mask: u8) -> Result<(), ExpanderError> {
        self.write_reg(reg::CONFIG, mask)
    }

    /// Drive a single output pin, leaving the others unchanged
    pub fn set_pin(&mut self, pin: u8, high: bool) -> Result<(), ExpanderError> {
        if pin > 7 {
            return Err(ExpanderError::BadPin);
        }
        let next = if high {
            self.output | (1 << pin)
        } else {
            self.output & !(1 << pin)
        };
        if next != self.output {
            self.write_reg(reg::OUTPUT, next)?;
            self.output = next;
        }
        Ok(())
    }

    /// Read the input port
    pub fn read_inputs(&mut self) -> Result<u8, ExpanderError> {
        let mut buf = [0u8];
        self.i2c
            .write_read(self.addr, &[reg::INPUT], &mut buf)
            .map_err(|_| ExpanderError::Bus)?;
        Ok(buf[0])
    }
}
