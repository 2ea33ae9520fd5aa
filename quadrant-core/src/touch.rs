//! Touch sample to pointer event mapping
//!
//! The touch controller reports up to [`MAX_TOUCH_POINTS`] physical
//! points per sample; the UI is single-pointer, so only point 0 is
//! consumed. The mapper inverts the display rotation so a finger on a
//! rotated screen lands on the widget drawn under it.

use crate::frame::{unrotate_point, PanelGeometry, PhysicalPoint, Rotation};

/// Maximum points the controller can report in one sample
pub const MAX_TOUCH_POINTS: usize = 5;

/// One raw contact point in the panel's native frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
    /// Contact strength/size as reported by the controller
    pub strength: u16,
}

/// Raw reading from the touch controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchSample {
    pub points: heapless::Vec<TouchPoint, MAX_TOUCH_POINTS>,
    pub pressed: bool,
}

impl TouchSample {
    /// A sample with no contact
    pub fn released() -> Self {
        Self::default()
    }

    /// True when at least one point is actually down
    pub fn is_pressed(&self) -> bool {
        self.pressed && !self.points.is_empty()
    }
}

/// Pointer button state in the engine's input model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerState {
    Pressed,
    Released,
}

/// Logical pointer sample handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerEvent {
    /// Clamped to `[0, logical_width - 1]`
    pub x: u16,
    /// Clamped to `[0, logical_height - 1]`
    pub y: u16,
    pub state: PointerState,
}

impl PointerEvent {
    /// Released event; coordinates are unused by the engine in this state
    pub const fn released() -> Self {
        Self {
            x: 0,
            y: 0,
            state: PointerState::Released,
        }
    }
}

/// Maps raw touch samples into the engine's logical frame
#[derive(Debug, Clone, Copy)]
pub struct TouchMapper {
    panel: PanelGeometry,
}

impl TouchMapper {
    pub const fn new(panel: PanelGeometry) -> Self {
        Self { panel }
    }

    /// Map one raw sample under the given rotation
    ///
    /// The rotation is read once by the caller and passed in whole, so
    /// a concurrent orientation change cannot tear a single sample.
    /// Only point 0 is consumed; the inverse transform runs against the
    /// *native* panel dimensions and the result is clamped (saturating,
    /// not wrapped) to the logical resolution of the current rotation.
    pub fn map(&self, sample: &TouchSample, rotation: Rotation) -> PointerEvent {
        if !sample.is_pressed() {
            return PointerEvent::released();
        }

        let p0 = sample.points[0];
        let logical = unrotate_point(
            PhysicalPoint {
                x: p0.x as i32,
                y: p0.y as i32,
            },
            rotation,
            self.panel,
        );

        let (lw, lh) = self.panel.logical_resolution(rotation);
        PointerEvent {
            x: logical.x.clamp(0, lw as i32 - 1) as u16,
            y: logical.y.clamp(0, lh as i32 - 1) as u16,
            state: PointerState::Pressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANEL: PanelGeometry = PanelGeometry::new(240, 320);

    fn pressed_at(x: u16, y: u16) -> TouchSample {
        let mut points = heapless::Vec::new();
        points.push(TouchPoint { x, y, strength: 40 }).unwrap();
        TouchSample {
            points,
            pressed: true,
        }
    }

    #[test]
    fn test_released_sample_maps_to_released() {
        let mapper = TouchMapper::new(PANEL);
        let ev = mapper.map(&TouchSample::released(), Rotation::Deg0);
        assert_eq!(ev.state, PointerState::Released);
    }

    #[test]
    fn test_pressed_flag_without_points_is_released() {
        // Malformed: controller claims pressed but reports no points
        let sample = TouchSample {
            points: heapless::Vec::new(),
            pressed: true,
        };
        let mapper = TouchMapper::new(PANEL);
        assert_eq!(mapper.map(&sample, Rotation::Deg0).state, PointerState::Released);
    }

    #[test]
    fn test_released_ignores_stale_coordinates() {
        // Stale coordinates in an unpressed sample must not leak through
        let mut points = heapless::Vec::new();
        points
            .push(TouchPoint {
                x: 100,
                y: 200,
                strength: 0,
            })
            .unwrap();
        let sample = TouchSample {
            points,
            pressed: false,
        };
        let mapper = TouchMapper::new(PANEL);
        let ev = mapper.map(&sample, Rotation::Deg90);
        assert_eq!(ev.state, PointerState::Released);
    }

    #[test]
    fn test_identity_mapping() {
        let mapper = TouchMapper::new(PANEL);
        let ev = mapper.map(&pressed_at(10, 20), Rotation::Deg0);
        assert_eq!((ev.x, ev.y, ev.state), (10, 20, PointerState::Pressed));
    }

    #[test]
    fn test_clamp_saturates_at_width() {
        // Logical resolution is (240, 320); an out-of-range x of 245
        // must clamp to 239, never wrap
        let mapper = TouchMapper::new(PANEL);
        let ev = mapper.map(&pressed_at(245, 100), Rotation::Deg0);
        assert_eq!(ev.x, 239);
        assert_eq!(ev.y, 100);
    }

    #[test]
    fn test_swapped_resolution_covers_whole_panel() {
        // At 90 degrees the logical resolution is (320, 240); the
        // panel's bottom-left inverts to the logical origin and the
        // top-left to the far logical column, no clamping involved
        let mapper = TouchMapper::new(PANEL);
        let ev = mapper.map(&pressed_at(0, 319), Rotation::Deg90);
        assert_eq!((ev.x, ev.y), (0, 0));

        let ev = mapper.map(&pressed_at(0, 0), Rotation::Deg90);
        assert_eq!((ev.x, ev.y), (319, 0));

        // A controller glitch past the panel edge saturates at the
        // logical origin instead of wrapping negative
        let ev = mapper.map(&pressed_at(0, 330), Rotation::Deg90);
        assert_eq!((ev.x, ev.y), (0, 0));
    }

    #[test]
    fn test_only_first_point_consumed() {
        let mut points = heapless::Vec::new();
        points.push(TouchPoint { x: 5, y: 6, strength: 10 }).unwrap();
        points.push(TouchPoint { x: 200, y: 300, strength: 10 }).unwrap();
        let sample = TouchSample {
            points,
            pressed: true,
        };
        let mapper = TouchMapper::new(PANEL);
        let ev = mapper.map(&sample, Rotation::Deg0);
        assert_eq!((ev.x, ev.y), (5, 6));
    }

    #[test]
    fn test_inverse_tracks_flush_transform() {
        use crate::frame::{rotate_point, LogicalPoint};

        // A widget drawn at logical p lands at physical q; touching q
        // must map back to p (clamped only at the panel edge)
        let mapper = TouchMapper::new(PANEL);
        for rot in [Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            let p = LogicalPoint { x: 17, y: 42 };
            let q = rotate_point(p, rot, PANEL);
            let ev = mapper.map(&pressed_at(q.x as u16, q.y as u16), rot);
            assert_eq!((ev.x as i32, ev.y as i32), (p.x, p.y), "rotation {:?}", rot);
        }
    }
}
