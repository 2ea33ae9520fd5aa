//! Coordinate frames and rotation transforms
//!
//! The rendering engine works in an orientation-independent *logical*
//! frame; the panel hardware works in its native *physical* frame. The
//! types here keep the two apart and provide the exact integer maps
//! between them for the four supported orientations.

pub mod rect;
pub mod transform;

pub use rect::{LogicalPoint, LogicalRect, PanelGeometry, PhysicalPoint, PhysicalRect};
pub use transform::{rotate_point, rotate_rect, unrotate_point, unrotate_rect, Rotation};
