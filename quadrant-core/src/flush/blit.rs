//! Software pixel rotation
//!
//! Rotates a `w x h` sub-rectangle of packed pixels into a destination
//! buffer laid out for the rotated rectangle. Always a copy, never
//! in-place. Strides are in bytes: the source stride comes from the
//! logical rectangle width, the destination stride from the *physical*
//! rectangle width.

use crate::frame::Rotation;

/// Packed pixel format of the draw buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorFormat {
    /// 16-bit 5-6-5
    #[default]
    Rgb565,
    /// 24-bit 8-8-8
    Rgb888,
}

impl ColorFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorFormat::Rgb565 => 2,
            ColorFormat::Rgb888 => 3,
        }
    }
}

/// Rotate a sub-rectangle of pixels from `src` into `dst`
///
/// `w` and `h` are the source rectangle's dimensions in pixels. For the
/// swapped orientations `dst` is laid out `h` pixels wide and `w` tall.
///
/// The in-rect pixel motion follows from the corner maps; the two
/// quarter turns move pixels in opposite senses and the half turn
/// reverses both axes.
pub fn rotate_pixels(
    src: &[u8],
    dst: &mut [u8],
    w: usize,
    h: usize,
    src_stride: usize,
    dst_stride: usize,
    rotation: Rotation,
    format: ColorFormat,
) {
    let bpp = format.bytes_per_pixel();

    match rotation {
        Rotation::Deg0 => {
            for ry in 0..h {
                let s = ry * src_stride;
                let d = ry * dst_stride;
                dst[d..d + w * bpp].copy_from_slice(&src[s..s + w * bpp]);
            }
        }
        Rotation::Deg90 => {
            // dst[w-1-rx][ry] = src[ry][rx]
            for ry in 0..h {
                for rx in 0..w {
                    let s = ry * src_stride + rx * bpp;
                    let d = (w - 1 - rx) * dst_stride + ry * bpp;
                    dst[d..d + bpp].copy_from_slice(&src[s..s + bpp]);
                }
            }
        }
        Rotation::Deg270 => {
            // dst[rx][h-1-ry] = src[ry][rx]
            for ry in 0..h {
                for rx in 0..w {
                    let s = ry * src_stride + rx * bpp;
                    let d = rx * dst_stride + (h - 1 - ry) * bpp;
                    dst[d..d + bpp].copy_from_slice(&src[s..s + bpp]);
                }
            }
        }
        Rotation::Deg180 => {
            // dst[h-1-ry][w-1-rx] = src[ry][rx]
            for ry in 0..h {
                for rx in 0..w {
                    let s = ry * src_stride + rx * bpp;
                    let d = (h - 1 - ry) * dst_stride + (w - 1 - rx) * bpp;
                    dst[d..d + bpp].copy_from_slice(&src[s..s + bpp]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x2 rectangle of single-byte-labelled RGB565 pixels:
    //   1 2 3
    //   4 5 6
    fn src_3x2() -> [u8; 12] {
        [1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6]
    }

    #[test]
    fn test_identity_copies_rows() {
        let src = src_3x2();
        let mut dst = [0u8; 12];
        rotate_pixels(&src, &mut dst, 3, 2, 6, 6, Rotation::Deg0, ColorFormat::Rgb565);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_quarter_turn_3x2() {
        // Destination is 2 wide, 3 tall; dst[w-1-rx][ry] = src[ry][rx]:
        //   3 6
        //   2 5
        //   1 4
        let src = src_3x2();
        let mut dst = [0u8; 12];
        rotate_pixels(&src, &mut dst, 3, 2, 6, 4, Rotation::Deg90, ColorFormat::Rgb565);
        assert_eq!(dst, [3, 3, 6, 6, 2, 2, 5, 5, 1, 1, 4, 4]);
    }

    #[test]
    fn test_counter_quarter_turn_3x2() {
        // The opposite quarter turn; dst[rx][h-1-ry] = src[ry][rx]:
        //   4 1
        //   5 2
        //   6 3
        let src = src_3x2();
        let mut dst = [0u8; 12];
        rotate_pixels(&src, &mut dst, 3, 2, 6, 4, Rotation::Deg270, ColorFormat::Rgb565);
        assert_eq!(dst, [4, 4, 1, 1, 5, 5, 2, 2, 6, 6, 3, 3]);
    }

    #[test]
    fn test_half_turn_3x2() {
        //   6 5 4
        //   3 2 1
        let src = src_3x2();
        let mut dst = [0u8; 12];
        rotate_pixels(&src, &mut dst, 3, 2, 6, 6, Rotation::Deg180, ColorFormat::Rgb565);
        assert_eq!(dst, [6, 6, 5, 5, 4, 4, 3, 3, 2, 2, 1, 1]);
    }

    #[test]
    fn test_wide_destination_stride() {
        // Destination rows wider than the rectangle (full-frame scratch)
        let src = src_3x2();
        let mut dst = [0xFFu8; 20]; // dst_stride 10, only 2 columns used per row
        rotate_pixels(&src, &mut dst, 3, 2, 6, 10, Rotation::Deg180, ColorFormat::Rgb565);
        assert_eq!(&dst[0..6], &[6, 6, 5, 5, 4, 4]);
        assert_eq!(&dst[10..16], &[3, 3, 2, 2, 1, 1]);
        // Untouched tail of each row keeps its previous contents
        assert_eq!(&dst[6..10], &[0xFF; 4]);
    }

    #[test]
    fn test_rgb888_chunks() {
        // 2x1 rect, 3 bytes per pixel
        let src = [1, 2, 3, 4, 5, 6];
        let mut dst = [0u8; 6];
        rotate_pixels(&src, &mut dst, 2, 1, 6, 3, Rotation::Deg90, ColorFormat::Rgb888);
        // dst is 1 wide, 2 tall: pixel (1) below pixel (2)
        assert_eq!(dst, [4, 5, 6, 1, 2, 3]);
    }
}
