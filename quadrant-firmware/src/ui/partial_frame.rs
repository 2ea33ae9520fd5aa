//! Draw target over one partial draw buffer
//!
//! Adapts a granted pool slot to embedded-graphics. The frame covers
//! one band of the logical screen; drawing uses absolute logical
//! coordinates and anything outside the band is clipped, so the same
//! scene can be replayed over consecutive bands.
//!
//! Pixels are stored big-endian RGB565, the byte order the panel
//! expects on the wire.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use quadrant_core::frame::LogicalRect;

pub struct PartialFrame<'a> {
    buf: &'a mut [u8],
    area: LogicalRect,
}

impl<'a> PartialFrame<'a> {
    /// Wrap a slot over a band of the logical screen
    ///
    /// `buf` must hold at least `area.area() * 2` bytes.
    pub fn new(buf: &'a mut [u8], area: LogicalRect) -> Self {
        debug_assert!(buf.len() as i64 >= area.area() * 2);
        Self { buf, area }
    }
}

impl Dimensions for PartialFrame<'_> {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.area.x1, self.area.y1),
            Size::new(self.area.width() as u32, self.area.height() as u32),
        )
    }
}

impl DrawTarget for PartialFrame<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Infallible>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        let w = self.area.width();
        for Pixel(p, color) in pixels {
            if p.x < self.area.x1 || p.x > self.area.x2 || p.y < self.area.y1 || p.y > self.area.y2
            {
                continue;
            }
            let idx = (((p.y - self.area.y1) * w + (p.x - self.area.x1)) * 2) as usize;
            let raw = color.into_storage().to_be_bytes();
            self.buf[idx] = raw[0];
            self.buf[idx + 1] = raw[1];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_placement_and_clipping() {
        let mut buf = [0u8; 3 * 2 * 2];
        let area = LogicalRect::new(10, 20, 12, 21);
        let mut frame = PartialFrame::new(&mut buf, area);

        frame
            .draw_iter([
                Pixel(Point::new(10, 20), Rgb565::WHITE),
                Pixel(Point::new(12, 21), Rgb565::WHITE),
                // Outside the band; must be clipped
                Pixel(Point::new(9, 20), Rgb565::WHITE),
                Pixel(Point::new(12, 22), Rgb565::WHITE),
            ])
            .unwrap();

        assert_eq!(&buf[0..2], &[0xFF, 0xFF]);
        assert_eq!(&buf[10..12], &[0xFF, 0xFF]);
        // Everything else untouched
        assert_eq!(&buf[2..10], &[0u8; 8]);
    }
}
