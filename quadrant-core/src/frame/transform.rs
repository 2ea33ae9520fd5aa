//! Rotation transform between the logical and physical frames
//!
//! All maps are exact integer arithmetic; they position hardware
//! display windows and must never round. Coordinates are inclusive on
//! both ends, so every map carries the `- 1` that keeps the last
//! addressable line in range. The corner maps are:
//!
//! - 0 degrees:   identity
//! - 90 degrees:  `(x, y) -> (y, H - 1 - x)`
//! - 180 degrees: `(x, y) -> (W - 1 - x, H - 1 - y)`
//! - 270 degrees: `(x, y) -> (W - 1 - y, x)`
//!
//! where `W`/`H` are the native panel width/height. Each map is a
//! bijection from the rotation's logical frame onto the panel, so an
//! in-bounds logical rectangle always lands fully on the panel;
//! `unrotate_*` applies the exact inverse.

use super::rect::{LogicalPoint, LogicalRect, PanelGeometry, PhysicalPoint, PhysicalRect};

/// Display orientation
///
/// Shared between the flush and touch paths; both must observe the same
/// value for any given frame or sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Decode a raw rotation value
    ///
    /// Anything outside 0..=3 is a programming error upstream and is
    /// normalized to the identity orientation rather than producing
    /// undefined geometry.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    pub const fn as_raw(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// True when logical width/height are swapped relative to the panel
    pub const fn is_swapped(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Next orientation clockwise
    pub const fn next(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }
}

/// Map a logical point into the panel's frame
pub const fn rotate_point(p: LogicalPoint, rotation: Rotation, panel: PanelGeometry) -> PhysicalPoint {
    let w = panel.width as i32;
    let h = panel.height as i32;
    match rotation {
        Rotation::Deg0 => PhysicalPoint { x: p.x, y: p.y },
        Rotation::Deg90 => PhysicalPoint { x: p.y, y: h - 1 - p.x },
        Rotation::Deg180 => PhysicalPoint {
            x: w - 1 - p.x,
            y: h - 1 - p.y,
        },
        Rotation::Deg270 => PhysicalPoint { x: w - 1 - p.y, y: p.x },
    }
}

/// Map a physical point back into the engine's frame
///
/// Exact inverse of [`rotate_point`]; this is the touch-side map.
pub const fn unrotate_point(p: PhysicalPoint, rotation: Rotation, panel: PanelGeometry) -> LogicalPoint {
    let w = panel.width as i32;
    let h = panel.height as i32;
    match rotation {
        Rotation::Deg0 => LogicalPoint { x: p.x, y: p.y },
        Rotation::Deg90 => LogicalPoint { x: h - 1 - p.y, y: p.x },
        Rotation::Deg180 => LogicalPoint {
            x: w - 1 - p.x,
            y: h - 1 - p.y,
        },
        Rotation::Deg270 => LogicalPoint { x: p.y, y: w - 1 - p.x },
    }
}

/// Map a logical dirty rectangle into the panel's frame
///
/// Corner maps applied per [`rotate_point`], corners re-sorted so the
/// result keeps `x1 <= x2`, `y1 <= y2`. Width and height swap at 90/270
/// but the covered area is preserved.
pub const fn rotate_rect(area: LogicalRect, rotation: Rotation, panel: PanelGeometry) -> PhysicalRect {
    let w = panel.width as i32;
    let h = panel.height as i32;
    match rotation {
        Rotation::Deg0 => PhysicalRect::new(area.x1, area.y1, area.x2, area.y2),
        Rotation::Deg90 => {
            PhysicalRect::new(area.y1, h - 1 - area.x2, area.y2, h - 1 - area.x1)
        }
        Rotation::Deg180 => PhysicalRect::new(
            w - 1 - area.x2,
            h - 1 - area.y2,
            w - 1 - area.x1,
            h - 1 - area.y1,
        ),
        Rotation::Deg270 => {
            PhysicalRect::new(w - 1 - area.y2, area.x1, w - 1 - area.y1, area.x2)
        }
    }
}

/// Map a physical window rectangle back into the engine's frame
///
/// Exact inverse of [`rotate_rect`].
pub const fn unrotate_rect(area: PhysicalRect, rotation: Rotation, panel: PanelGeometry) -> LogicalRect {
    let w = panel.width as i32;
    let h = panel.height as i32;
    match rotation {
        Rotation::Deg0 => LogicalRect::new(area.x1, area.y1, area.x2, area.y2),
        Rotation::Deg90 => {
            LogicalRect::new(h - 1 - area.y2, area.x1, h - 1 - area.y1, area.x2)
        }
        Rotation::Deg180 => LogicalRect::new(
            w - 1 - area.x2,
            h - 1 - area.y2,
            w - 1 - area.x1,
            h - 1 - area.y1,
        ),
        Rotation::Deg270 => {
            LogicalRect::new(area.y1, w - 1 - area.x2, area.y2, w - 1 - area.x1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PANEL: PanelGeometry = PanelGeometry::new(240, 320);

    const ALL_ROTATIONS: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[test]
    fn test_from_raw_normalizes_unknown_values() {
        assert_eq!(Rotation::from_raw(0), Rotation::Deg0);
        assert_eq!(Rotation::from_raw(1), Rotation::Deg90);
        assert_eq!(Rotation::from_raw(2), Rotation::Deg180);
        assert_eq!(Rotation::from_raw(3), Rotation::Deg270);
        // Out-of-contract values fall back to identity
        assert_eq!(Rotation::from_raw(4), Rotation::Deg0);
        assert_eq!(Rotation::from_raw(255), Rotation::Deg0);
    }

    #[test]
    fn test_identity_is_identity() {
        let r = LogicalRect::new(5, 7, 30, 40);
        let phys = rotate_rect(r, Rotation::Deg0, PANEL);
        assert_eq!((phys.x1, phys.y1, phys.x2, phys.y2), (5, 7, 30, 40));
    }

    #[test]
    fn test_corners_stay_corners_at_90() {
        // Logical (0,0) lands on the panel's bottom-left at 90 degrees
        let p = rotate_point(LogicalPoint { x: 0, y: 0 }, Rotation::Deg90, PANEL);
        assert_eq!(p, PhysicalPoint { x: 0, y: 319 });

        // And the inverse brings it back
        let back = unrotate_point(p, Rotation::Deg90, PANEL);
        assert_eq!(back, LogicalPoint { x: 0, y: 0 });

        // The far logical corner (319, 239) lands on (239, 0)
        let far = rotate_point(LogicalPoint { x: 319, y: 239 }, Rotation::Deg90, PANEL);
        assert_eq!(far, PhysicalPoint { x: 239, y: 0 });
    }

    #[test]
    fn test_full_screen_maps_onto_panel() {
        // A full logical screen covers exactly the panel at every
        // orientation; no window coordinate leaves [0, W) x [0, H)
        for rot in ALL_ROTATIONS {
            let (lw, lh) = PANEL.logical_resolution(rot);
            let full = LogicalRect::new(0, 0, lw as i32 - 1, lh as i32 - 1);
            let phys = rotate_rect(full, rot, PANEL);
            assert_eq!(
                (phys.x1, phys.y1, phys.x2, phys.y2),
                (0, 0, 239, 319),
                "rotation {:?}",
                rot
            );
        }
    }

    #[test]
    fn test_point_round_trip_all_rotations() {
        for rot in ALL_ROTATIONS {
            for &(x, y) in &[(0, 0), (1, 2), (239, 319), (120, 160)] {
                let p = LogicalPoint { x, y };
                let back = unrotate_point(rotate_point(p, rot, PANEL), rot, PANEL);
                assert_eq!(back, p, "rotation {:?}", rot);
            }
        }
    }

    #[test]
    fn test_rect_round_trip_all_rotations() {
        let rects = [
            LogicalRect::new(0, 0, 239, 319),
            LogicalRect::new(0, 0, 0, 0),
            LogicalRect::new(10, 20, 50, 60),
            LogicalRect::new(200, 300, 239, 319),
        ];
        for rot in ALL_ROTATIONS {
            for r in rects {
                let back = unrotate_rect(rotate_rect(r, rot, PANEL), rot, PANEL);
                assert_eq!(back, r, "rotation {:?}", rot);
            }
        }
    }

    #[test]
    fn test_area_preserved_with_axis_swap() {
        let r = LogicalRect::new(10, 20, 49, 99); // 40 x 80
        for rot in ALL_ROTATIONS {
            let phys = rotate_rect(r, rot, PANEL);
            assert!(phys.is_valid());
            assert_eq!(phys.area(), r.area(), "rotation {:?}", rot);
            if rot.is_swapped() {
                assert_eq!(phys.width(), r.height());
                assert_eq!(phys.height(), r.width());
            } else {
                assert_eq!(phys.width(), r.width());
                assert_eq!(phys.height(), r.height());
            }
        }
    }

    proptest! {
        #[test]
        fn prop_rect_round_trip(
            x1 in 0i32..240,
            y1 in 0i32..320,
            dw in 0i32..240,
            dh in 0i32..320,
            raw in 0u8..4,
        ) {
            let r = LogicalRect::new(x1, y1, (x1 + dw).min(239), (y1 + dh).min(319));
            let rot = Rotation::from_raw(raw);
            let back = unrotate_rect(rotate_rect(r, rot, PANEL), rot, PANEL);
            prop_assert_eq!(back, r);
        }

        #[test]
        fn prop_area_preserved(
            x1 in 0i32..240,
            y1 in 0i32..320,
            dw in 0i32..240,
            dh in 0i32..320,
            raw in 0u8..4,
        ) {
            let r = LogicalRect::new(x1, y1, (x1 + dw).min(239), (y1 + dh).min(319));
            let rot = Rotation::from_raw(raw);
            let phys = rotate_rect(r, rot, PANEL);
            prop_assert!(phys.is_valid());
            prop_assert_eq!(phys.area(), r.area());
        }

        #[test]
        fn prop_in_bounds_rects_land_on_panel(
            xa in 0i32..320,
            ya in 0i32..320,
            dw in 0i32..320,
            dh in 0i32..320,
            raw in 0u8..4,
        ) {
            // Rects drawn from the rotation's own logical domain must
            // produce windows the panel can actually address
            let rot = Rotation::from_raw(raw);
            let (lw, lh) = PANEL.logical_resolution(rot);
            let (lw, lh) = (lw as i32, lh as i32);
            let x1 = xa % lw;
            let y1 = ya % lh;
            let r = LogicalRect::new(x1, y1, (x1 + dw).min(lw - 1), (y1 + dh).min(lh - 1));
            let phys = rotate_rect(r, rot, PANEL);
            prop_assert!(phys.x1 >= 0 && phys.y1 >= 0);
            prop_assert!(phys.x2 < 240 && phys.y2 < 320);
        }
    }
}
