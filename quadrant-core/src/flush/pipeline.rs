//! Flush pipeline
//!
//! One flush: read the rotation (passed in, read once by the caller),
//! rotate the rectangle and its pixels into the panel frame if needed,
//! hand the result to the display sink, then fire the completion
//! signal. The completion signal releases the engine to start filling
//! the other draw buffer, so it must never fire before the pixel data
//! has been handed off (or copied out, in the rotated case).
//!
//! Write failures are absorbed: the frame is dropped and counted, the
//! next dirty rectangle will redraw the region. Nothing here panics
//! into the render loop.

use crate::frame::{rotate_rect, LogicalRect, PanelGeometry, Rotation};
use crate::traits::DisplaySink;

use super::blit::{rotate_pixels, ColorFormat};

/// Pipeline construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineError {
    /// Scratch buffer smaller than one full panel frame
    ScratchTooSmall,
}

/// Converts logical dirty rectangles into physical window writes
pub struct FlushPipeline<'b, S: DisplaySink> {
    sink: S,
    panel: PanelGeometry,
    format: ColorFormat,
    /// Full-frame buffer used only when rotation is non-identity
    scratch: &'b mut [u8],
    dropped_frames: u32,
}

impl<'b, S: DisplaySink> FlushPipeline<'b, S> {
    /// Wire the pipeline to a sink
    ///
    /// `scratch` must hold at least one full panel frame in `format`;
    /// it is allocated once at bring-up and lives for the process.
    pub fn new(
        sink: S,
        panel: PanelGeometry,
        format: ColorFormat,
        scratch: &'b mut [u8],
    ) -> Result<Self, PipelineError> {
        if scratch.len() < panel.area() * format.bytes_per_pixel() {
            return Err(PipelineError::ScratchTooSmall);
        }
        Ok(Self {
            sink,
            panel,
            format,
            scratch,
            dropped_frames: 0,
        })
    }

    /// Panel geometry the pipeline was wired for
    pub fn panel(&self) -> PanelGeometry {
        self.panel
    }

    /// Frames dropped due to sink write failures or malformed input
    pub fn dropped_frames(&self) -> u32 {
        self.dropped_frames
    }

    /// The wired sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Flush one dirty rectangle
    ///
    /// `px_map` holds the rectangle's pixels, rows packed at the
    /// logical width. `flush_ready` fires after the data has been
    /// handed to the sink (pass or fail); the engine may reuse the
    /// buffer from that point on.
    pub fn flush<F: FnOnce()>(
        &mut self,
        rotation: Rotation,
        area: LogicalRect,
        px_map: &[u8],
        flush_ready: F,
    ) {
        let bpp = self.format.bytes_per_pixel();
        let w = area.width() as usize;
        let h = area.height() as usize;
        let src_bytes = w * h * bpp;

        if !area.is_valid() || px_map.len() < src_bytes {
            // Malformed input from the engine; drop rather than feed
            // the panel a short buffer
            self.dropped_frames = self.dropped_frames.wrapping_add(1);
            flush_ready();
            return;
        }

        let result = if rotation == Rotation::Deg0 {
            // Physical rectangle equals the logical one; forward as-is
            let phys = rotate_rect(area, rotation, self.panel);
            self.sink.write_window(phys, &px_map[..src_bytes])
        } else {
            let phys = rotate_rect(area, rotation, self.panel);
            // Source stride from the logical width, destination stride
            // from the physical width
            let src_stride = w * bpp;
            let dst_stride = phys.width() as usize * bpp;
            rotate_pixels(
                &px_map[..src_bytes],
                self.scratch,
                w,
                h,
                src_stride,
                dst_stride,
                rotation,
                self.format,
            );
            let out_bytes = phys.height() as usize * dst_stride;
            self.sink.write_window(phys, &self.scratch[..out_bytes])
        };

        if let Err(_e) = result {
            // Dropped frame; the next flush of this region redraws it
            #[cfg(feature = "defmt")]
            defmt::warn!("flush write failed: {}, frame dropped", _e);
            self.dropped_frames = self.dropped_frames.wrapping_add(1);
        }

        flush_ready();
    }
}
