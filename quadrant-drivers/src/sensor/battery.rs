//! Battery voltage monitor
//!
//! Single-cell LiPo sensed through a resistor divider into an ADC
//! channel. Voltage is reported in millivolts; a state-of-charge
//! estimate comes from a discharge-curve lookup table with linear
//! interpolation, integer-only.

/// LiPo discharge curve: (cell millivolts, percent)
///
/// Resting voltage under light load; sorted by decreasing voltage.
const SOC_TABLE: &[(u16, u8)] = &[
    (4200, 100),
    (4060, 90),
    (3980, 80),
    (3920, 70),
    (3870, 60),
    (3820, 50),
    (3790, 40),
    (3770, 30),
    (3740, 20),
    (3680, 10),
    (3450, 5),
    (3000, 0),
];

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

/// Battery monitor behind a resistor divider
pub struct BatteryMonitor<ADC> {
    adc: ADC,
    /// ADC reference voltage in mV
    vref_mv: u32,
    /// Divider ratio numerator (battery mV = pin mV * num / den)
    divider_num: u32,
    divider_den: u32,
}

impl<ADC> BatteryMonitor<ADC> {
    /// Create a monitor
    ///
    /// `divider` is the voltage divider as (numerator, denominator);
    /// a half-voltage divider is (2, 1).
    pub fn new(adc: ADC, vref_mv: u32, divider: (u32, u32)) -> Self {
        Self {
            adc,
            vref_mv,
            divider_num: divider.0,
            divider_den: divider.1,
        }
    }

    /// Convert a raw ADC reading to battery millivolts
    pub fn raw_to_mv(&self, raw: u16) -> u16 {
        let pin_mv = raw as u32 * self.vref_mv / 4095;
        (pin_mv * self.divider_num / self.divider_den) as u16
    }

    /// Estimate state of charge from cell voltage
    pub fn mv_to_percent(mv: u16) -> u8 {
        if mv >= SOC_TABLE[0].0 {
            return 100;
        }
        if mv <= SOC_TABLE[SOC_TABLE.len() - 1].0 {
            return 0;
        }

        for i in 0..SOC_TABLE.len() - 1 {
            let (v_high, p_high) = SOC_TABLE[i];
            let (v_low, p_low) = SOC_TABLE[i + 1];
            if mv <= v_high && mv >= v_low {
                let v_range = (v_high - v_low) as u32;
                let p_range = (p_high - p_low) as u32;
                let offset = (mv - v_low) as u32;
                return p_low + (p_range * offset / v_range) as u8;
            }
        }
        0
    }
}

impl<ADC: AdcReader> BatteryMonitor<ADC> {
    /// Read the battery voltage in millivolts
    #[allow(clippy::result_unit_err)]
    pub fn read_mv(&mut self) -> Result<u16, ()> {
        let raw = self.adc.read()?;
        Ok(self.raw_to_mv(raw))
    }
}
