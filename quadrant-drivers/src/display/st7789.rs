//! ST7789 TFT controller (4-wire SPI)
//!
//! 240x320 panel driven in RGB565 over SPI with a separate
//! data/command line. The controller is always addressed in its native
//! portrait frame; orientation handling happens upstream in software,
//! so MADCTL stays at its reset row/column order and only sets the RGB
//! pixel order.
//!
//! Window writes are synchronous: set the column/row address window,
//! then stream the packed pixel data with a single RAMWR.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use quadrant_core::frame::{PanelGeometry, PhysicalRect};
use quadrant_core::traits::{DisplaySink, SinkError};

/// ST7789 command bytes
pub mod cmd {
    /// Software reset
    pub const SWRESET: u8 = 0x01;
    /// Exit sleep mode
    pub const SLPOUT: u8 = 0x11;
    /// Display inversion on (panel is normally-inverted IPS glass)
    pub const INVON: u8 = 0x21;
    /// Display on
    pub const DISPON: u8 = 0x29;
    /// Column address window
    pub const CASET: u8 = 0x2A;
    /// Row address window
    pub const RASET: u8 = 0x2B;
    /// Memory write
    pub const RAMWR: u8 = 0x2C;
    /// Memory access control (scan order, RGB/BGR)
    pub const MADCTL: u8 = 0x36;
    /// Interface pixel format
    pub const COLMOD: u8 = 0x3A;
}

/// COLMOD value for 16-bit RGB565
const COLMOD_RGB565: u8 = 0x55;

/// ST7789 panel driver
///
/// `SPI` carries the pixel stream; `DC` selects command vs data bytes;
/// `RST` is the hardware reset line. Chip select is expected to be
/// handled by the bus (tied low or managed by the SPI peripheral).
pub struct St7789<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
    geometry: PanelGeometry,
}

impl<SPI, DC, RST> St7789<SPI, DC, RST>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, geometry: PanelGeometry) -> Self {
        Self {
            spi,
            dc,
            rst,
            geometry,
        }
    }

    /// Native panel geometry
    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    fn command(&mut self, cmd: u8) -> Result<(), SinkError> {
        self.dc.set_low().map_err(|_| SinkError::Bus)?;
        self.spi.write(&[cmd]).map_err(|_| SinkError::Bus)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.dc.set_high().map_err(|_| SinkError::Bus)?;
        self.spi.write(bytes).map_err(|_| SinkError::Bus)
    }

    /// Hardware reset followed by the panel bring-up sequence
    ///
    /// Must complete before the first window write; a failure here is
    /// fatal to bring-up since nothing can be shown without the panel.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), SinkError> {
        self.rst.set_high().map_err(|_| SinkError::Bus)?;
        delay.delay_ms(10);
        self.rst.set_low().map_err(|_| SinkError::Bus)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(|_| SinkError::Bus)?;
        delay.delay_ms(120);

        self.command(cmd::SWRESET)?;
        delay.delay_ms(120);
        self.command(cmd::SLPOUT)?;
        delay.delay_ms(120);

        self.command(cmd::COLMOD)?;
        self.data(&[COLMOD_RGB565])?;
        // Native scan order; software rotation owns orientation
        self.command(cmd::MADCTL)?;
        self.data(&[0x00])?;

        self.command(cmd::INVON)?;
        self.command(cmd::DISPON)?;
        delay.delay_ms(20);
        Ok(())
    }

    /// Program the column/row address window
    ///
    /// Coordinates are inclusive on both ends, as the controller
    /// expects. The window must lie fully on the panel: inverted,
    /// negative, or past-the-edge rectangles are rejected before any
    /// byte reaches the bus.
    pub fn set_window(&mut self, area: PhysicalRect) -> Result<(), SinkError> {
        if !area.is_valid()
            || area.x1 < 0
            || area.y1 < 0
            || area.x2 >= self.geometry.width as i32
            || area.y2 >= self.geometry.height as i32
        {
            return Err(SinkError::BadWindow);
        }
        self.command(cmd::CASET)?;
        self.data(&[
            (area.x1 >> 8) as u8,
            area.x1 as u8,
            (area.x2 >> 8) as u8,
            area.x2 as u8,
        ])?;
        self.command(cmd::RASET)?;
        self.data(&[
            (area.y1 >> 8) as u8,
            area.y1 as u8,
            (area.y2 >> 8) as u8,
            area.y2 as u8,
        ])
    }

    /// Stream packed RGB565 pixels into the current window
    pub fn write_pixels(&mut self, px: &[u8]) -> Result<(), SinkError> {
        self.command(cmd::RAMWR)?;
        self.data(px)
    }
}

impl<SPI, DC, RST> DisplaySink for St7789<SPI, DC, RST>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
{
    fn write_window(&mut self, area: PhysicalRect, px: &[u8]) -> Result<(), SinkError> {
        self.set_window(area)?;
        self.write_pixels(px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;

    /// Byte log shared between the SPI and DC mocks: (dc_high, byte)
    #[derive(Default)]
    struct BusLog {
        entries: heapless::Vec<(bool, u8), 64>,
        dc: bool,
    }

    struct MockSpi<'a>(&'a RefCell<BusLog>);
    struct MockDc<'a>(&'a RefCell<BusLog>);
    struct MockRst;

    impl embedded_hal::spi::ErrorType for MockSpi<'_> {
        type Error = Infallible;
    }

    impl SpiBus for MockSpi<'_> {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            let mut log = self.0.borrow_mut();
            let dc = log.dc;
            for &b in words {
                let _ = log.entries.push((dc, b));
            }
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
            read.fill(0);
            self.write(write)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for MockDc<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockDc<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().dc = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().dc = true;
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for MockRst {
        type Error = Infallible;
    }

    impl OutputPin for MockRst {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    #[test]
    fn test_set_window_byte_stream() {
        let log = RefCell::new(BusLog::default());
        let mut panel = St7789::new(
            MockSpi(&log),
            MockDc(&log),
            MockRst,
            PanelGeometry::new(240, 320),
        );

        panel
            .set_window(PhysicalRect::new(0x02, 0x0104, 0x05, 0x013E))
            .unwrap();

        let expected: &[(bool, u8)] = &[
            (false, cmd::CASET),
            (true, 0x00),
            (true, 0x02),
            (true, 0x00),
            (true, 0x05),
            (false, cmd::RASET),
            (true, 0x01),
            (true, 0x04),
            (true, 0x01),
            (true, 0x3E),
        ];
        assert_eq!(log.borrow().entries.as_slice(), expected);
    }

    #[test]
    fn test_bad_window_rejected() {
        let log = RefCell::new(BusLog::default());
        let mut panel = St7789::new(
            MockSpi(&log),
            MockDc(&log),
            MockRst,
            PanelGeometry::new(240, 320),
        );

        // Inverted
        assert_eq!(
            panel.set_window(PhysicalRect::new(10, 10, 5, 20)),
            Err(SinkError::BadWindow)
        );
        // Negative origin
        assert_eq!(
            panel.set_window(PhysicalRect::new(-1, 0, 5, 5)),
            Err(SinkError::BadWindow)
        );
        // Past the last addressable column/row
        assert_eq!(
            panel.set_window(PhysicalRect::new(239, 319, 240, 320)),
            Err(SinkError::BadWindow)
        );
        assert!(log.borrow().entries.is_empty());

        // The full panel itself is addressable
        assert!(panel.set_window(PhysicalRect::new(0, 0, 239, 319)).is_ok());
    }

    #[test]
    fn test_full_screen_flush_accepted_at_every_rotation() {
        use quadrant_core::flush::{ColorFormat, FlushPipeline};
        use quadrant_core::frame::{LogicalRect, Rotation};

        // End to end: full logical screens at all four orientations
        // must pass the window check and reach the panel
        let log = RefCell::new(BusLog::default());
        let geometry = PanelGeometry::new(240, 320);
        let panel = St7789::new(MockSpi(&log), MockDc(&log), MockRst, geometry);

        let mut scratch = std::vec![0u8; geometry.area() * 2];
        let mut pipeline =
            FlushPipeline::new(panel, geometry, ColorFormat::Rgb565, &mut scratch).unwrap();

        for rot in [
            Rotation::Deg0,
            Rotation::Deg90,
            Rotation::Deg180,
            Rotation::Deg270,
        ] {
            let (lw, lh) = geometry.logical_resolution(rot);
            let full = LogicalRect::new(0, 0, lw as i32 - 1, lh as i32 - 1);
            let px = std::vec![0u8; lw as usize * lh as usize * 2];
            pipeline.flush(rot, full, &px, || {});
        }

        assert_eq!(pipeline.dropped_frames(), 0);
    }

    #[test]
    fn test_write_window_streams_pixels_after_ramwr() {
        let log = RefCell::new(BusLog::default());
        let mut panel = St7789::new(
            MockSpi(&log),
            MockDc(&log),
            MockRst,
            PanelGeometry::new(240, 320),
        );

        panel
            .write_window(PhysicalRect::new(0, 0, 0, 0), &[0xAB, 0xCD])
            .unwrap();

        let entries = log.borrow();
        let tail = &entries.entries[entries.entries.len() - 3..];
        assert_eq!(tail, &[(false, cmd::RAMWR), (true, 0xAB), (true, 0xCD)]);
    }
}
