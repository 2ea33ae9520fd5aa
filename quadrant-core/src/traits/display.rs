//! Display sink trait for the physical panel

use crate::frame::PhysicalRect;

/// Errors a panel write can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Bus transfer failed
    Bus,
    /// Controller did not accept the write in time
    Timeout,
    /// Window rectangle is inverted, negative, or off the panel
    BadWindow,
}

/// Abstraction over the physical panel
///
/// Accepts a window rectangle in the panel's native frame plus packed
/// pixel data sized to that rectangle, and performs the hardware write.
/// The write is synchronous; a failure means the frame is dropped by
/// the caller, never retried here.
pub trait DisplaySink {
    /// Set the controller window to `area` and blit `px` into it
    ///
    /// `px` holds exactly `area.width() * area.height()` packed pixels
    /// in the sink's color format.
    fn write_window(&mut self, area: PhysicalRect, px: &[u8]) -> Result<(), SinkError>;
}
