// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid cells and their render-space overlay positions.
//!
//! Selectors enumerate [`CellCoord`]s in logical map-grid space. Before a
//! highlight quad can be drawn, the cell is mapped to an [`OverlayPos`]: the
//! cell's center in world units, lifted to [`OVERLAY_ALTITUDE`] so the
//! overlay draws above terrain rather than z-fighting with it.

use core::fmt;

use kurbo::Rect;

/// Fixed altitude at which highlight overlays are drawn.
///
/// High enough to clear terrain and placed structures on every map.
pub const OVERLAY_ALTITUDE: f64 = 10.0;

/// A logical map grid cell.
///
/// Cells tile the ground plane; `x` and `z` index columns and rows. The
/// vertical axis is reserved for rendering and has no grid meaning.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CellCoord {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub z: i32,
}

impl CellCoord {
    /// Creates a cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the unit world-space rectangle this cell covers, on the
    /// ground plane.
    ///
    /// Render targets can union footprints to compute damage bounds for
    /// partial redraws.
    #[inline]
    #[must_use]
    pub fn footprint(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.z),
            f64::from(self.x) + 1.0,
            f64::from(self.z) + 1.0,
        )
    }
}

impl fmt::Debug for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellCoord({}, {})", self.x, self.z)
    }
}

/// A render-space position for one highlight quad.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct OverlayPos {
    /// World-space x (cell center).
    pub x: f64,
    /// World-space altitude.
    pub y: f64,
    /// World-space z (cell center).
    pub z: f64,
}

impl OverlayPos {
    /// Returns the overlay position for a cell: its center on the ground
    /// plane, lifted to [`OVERLAY_ALTITUDE`].
    #[inline]
    #[must_use]
    pub fn above_cell(cell: CellCoord) -> Self {
        Self {
            x: f64::from(cell.x) + 0.5,
            y: OVERLAY_ALTITUDE,
            z: f64::from(cell.z) + 0.5,
        }
    }
}
