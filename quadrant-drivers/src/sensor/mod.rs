//! Sensor drivers

pub mod battery;
pub mod pcf85063;
pub mod qmi8658;

pub use battery::BatteryMonitor;
pub use pcf85063::Pcf85063;
pub use qmi8658::Qmi8658;

/// Errors shared by the I2C sensor drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transfer failed
    Bus,
    /// Chip identification readback did not match
    WrongChip,
    /// Reading is not trustworthy (e.g. RTC lost power)
    Invalid,
}
