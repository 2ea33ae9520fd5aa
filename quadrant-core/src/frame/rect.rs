//! Rectangle and point types for the logical and physical frames
//!
//! Rectangles are axis-aligned with *inclusive* corner coordinates,
//! matching the window addressing of the panel controller. Keeping the
//! logical and physical variants as separate types prevents a rectangle
//! from crossing frames without going through the rotation transform.

use super::transform::Rotation;

/// A point in the engine's orientation-independent frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalPoint {
    pub x: i32,
    pub y: i32,
}

/// A point in the panel's native frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalPoint {
    pub x: i32,
    pub y: i32,
}

/// A dirty rectangle in the engine's frame (corners inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogicalRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// A window rectangle in the panel's frame (corners inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhysicalRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

macro_rules! rect_impl {
    ($name:ident) => {
        impl $name {
            pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
                Self { x1, y1, x2, y2 }
            }

            /// Width in pixels (corners are inclusive)
            pub const fn width(&self) -> i32 {
                self.x2 - self.x1 + 1
            }

            /// Height in pixels (corners are inclusive)
            pub const fn height(&self) -> i32 {
                self.y2 - self.y1 + 1
            }

            /// Pixel count covered by the rectangle
            pub const fn area(&self) -> i64 {
                self.width() as i64 * self.height() as i64
            }

            /// True when the corners describe a non-empty rectangle
            pub const fn is_valid(&self) -> bool {
                self.x1 <= self.x2 && self.y1 <= self.y2
            }
        }
    };
}

rect_impl!(LogicalRect);
rect_impl!(PhysicalRect);

/// Native dimensions of the panel, independent of rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelGeometry {
    /// Native panel width in pixels
    pub width: u16,
    /// Native panel height in pixels
    pub height: u16,
}

impl PanelGeometry {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Pixel count of the full panel
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Engine-facing resolution for a rotation
    ///
    /// Width and height swap for the 90/270 degree orientations. This
    /// is the clamp bound for pointer events.
    pub const fn logical_resolution(&self, rotation: Rotation) -> (u16, u16) {
        if rotation.is_swapped() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}
