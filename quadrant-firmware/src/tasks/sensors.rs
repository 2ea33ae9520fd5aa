//! Background sensor poller
//!
//! Polls the battery ADC, IMU and RTC on a fixed cadence and publishes
//! the readings through the channels module. Shares nothing with the
//! render loop beyond those published values. Peripherals that failed
//! bring-up are skipped; the device runs degraded rather than not at
//! all.
//!
//! The RTC and IMU share one I2C bus; each poll borrows the bus for
//! one transaction at a time.

use defmt::*;
use embassy_rp::adc::{self, Adc};
use embassy_time::{Duration, Ticker};

use quadrant_drivers::sensor::battery::{AdcReader, BatteryMonitor};
use quadrant_drivers::sensor::pcf85063::Pcf85063;
use quadrant_drivers::sensor::qmi8658::Qmi8658;
use quadrant_drivers::sensor::SensorError;

use crate::channels;

use super::SensorBus;

/// The on-chip ADC channel sensing the battery divider
pub struct BatteryAdc {
    adc: Adc<'static, adc::Blocking>,
    channel: adc::Channel<'static>,
}

impl BatteryAdc {
    pub fn new(adc: Adc<'static, adc::Blocking>, channel: adc::Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for BatteryAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc.blocking_read(&mut self.channel).map_err(|_| ())
    }
}

#[embassy_executor::task]
pub async fn sensors_task(
    mut bus: SensorBus,
    mut battery: BatteryMonitor<BatteryAdc>,
    imu_ok: bool,
    rtc_ok: bool,
    poll_ms: u32,
) {
    info!("sensor task started, poll period {} ms", poll_ms);

    let mut ticker = Ticker::every(Duration::from_millis(poll_ms as u64));

    loop {
        ticker.next().await;

        if let Ok(mv) = battery.read_mv() {
            channels::BATTERY_MV.signal(mv);
        }

        if imu_ok {
            match Qmi8658::new(&mut bus).read_motion() {
                Ok(sample) => channels::ACCEL.signal(sample),
                Err(_) => trace!("imu read failed, keeping last value"),
            }
        }

        if rtc_ok {
            match Pcf85063::new(&mut bus).read_datetime() {
                Ok(dt) => channels::WALL_CLOCK.signal(Some(dt)),
                // Clock lost power; show the unset state until someone
                // sets it again
                Err(SensorError::Invalid) => channels::WALL_CLOCK.signal(None),
                Err(_) => trace!("rtc read failed, keeping last value"),
            }
        }
    }
}
