//! Point types for the two engines.
//!
//! [`Point`] is the pipeline-facing 3-D sample: the sweep engine reads only
//! `x` and `y`; the third coordinate (typically elevation) passes through
//! untouched because the engine emits index triples, never coordinates.
//!
//! [`GridPoint`] is a discretized coordinate on the fixed lattice the
//! quad-edge engine operates on.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A double-precision point with a pass-through third coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (the sweep axis).
    pub y: f64,
    /// Pass-through coordinate, unused by triangulation logic.
    pub z: f64,
}

impl Point {
    /// Creates a planar point with `z = 0`.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Creates a point carrying an extra pass-through coordinate.
    #[inline]
    #[must_use]
    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The `(y, then x)` ascending order the sweep engine requires of its
    /// input stream.
    #[must_use]
    pub fn cmp_yx(&self, other: &Self) -> Ordering {
        match self.y.partial_cmp(&other.y) {
            Some(Ordering::Equal) | None => {
                self.x.partial_cmp(&other.x).unwrap_or(Ordering::Equal)
            }
            Some(ord) => ord,
        }
    }

    /// Euclidean distance in the plane (ignores `z`).
    #[must_use]
    pub fn dist(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A coordinate on the grid engine's width×height lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column (x) index.
    pub col: u32,
    /// Row (y) index.
    pub row: u32,
}

impl GridPoint {
    /// Creates a lattice coordinate.
    #[inline]
    #[must_use]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Column as a signed coordinate for exact predicates.
    #[inline]
    #[must_use]
    pub const fn xi(self) -> i64 {
        self.col as i64
    }

    /// Row as a signed coordinate for exact predicates.
    #[inline]
    #[must_use]
    pub const fn yi(self) -> i64 {
        self.row as i64
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn yx_order_is_y_major() {
        let a = Point::new(5.0, 1.0);
        let b = Point::new(0.0, 2.0);
        let c = Point::new(1.0, 2.0);
        assert_eq!(a.cmp_yx(&b), Ordering::Less);
        assert_eq!(b.cmp_yx(&c), Ordering::Less);
        assert_eq!(c.cmp_yx(&c), Ordering::Equal);
    }

    #[test]
    fn dist_ignores_elevation() {
        let a = Point::with_z(0.0, 0.0, 100.0);
        let b = Point::with_z(3.0, 4.0, -50.0);
        assert_relative_eq!(a.dist(&b), 5.0);
    }

    #[test]
    fn grid_point_signed_accessors() {
        let p = GridPoint::new(7, 11);
        assert_eq!(p.xi(), 7);
        assert_eq!(p.yi(), 11);
    }
}
