//! Exact orientation and in-circle predicates on lattice coordinates.
//!
//! The grid engine works on integer lattice points, so both predicates can be
//! evaluated exactly in wide integer arithmetic: the orientation determinant
//! fits `i64` products and the in-circle determinant is accumulated in `i128`.
//! Exactness makes every tie-break deterministic: cocircular configurations
//! report [`InCircle::On`] and are never flipped, which is what pins the unit
//! square to the same diagonal on every run.
//!
//! Both predicates require coordinates below `1 << 30`; past that the
//! orientation products leave `i64` and the in-circle accumulation leaves
//! `i128`. [`GridMesh`](crate::quadedge::mesh::GridMesh) caps its lattice
//! dimensions at [`MAX_GRID_DIM`](crate::quadedge::mesh::MAX_GRID_DIM) to
//! enforce the bound.

use crate::geometry::point::GridPoint;

/// Position of a query point relative to a triangle's circumcircle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InCircle {
    /// Strictly outside the circumcircle.
    Outside,
    /// On the circumcircle (exact tie).
    On,
    /// Strictly inside the circumcircle.
    Inside,
}

/// Twice the signed area of triangle `(a, b, c)`.
///
/// Positive for a counterclockwise turn, negative for clockwise, zero for
/// colinear points. Coordinates must stay below `1 << 30` for the products
/// to fit `i64`; lattices built through
/// [`GridMesh`](crate::quadedge::mesh::GridMesh) satisfy this.
#[inline]
#[must_use]
pub fn cross(a: GridPoint, b: GridPoint, c: GridPoint) -> i64 {
    (b.xi() - a.xi()) * (c.yi() - a.yi()) - (b.yi() - a.yi()) * (c.xi() - a.xi())
}

/// Whether `(a, b, c)` makes a strict counterclockwise turn.
#[inline]
#[must_use]
pub fn ccw(a: GridPoint, b: GridPoint, c: GridPoint) -> bool {
    cross(a, b, c) > 0
}

/// Whether `c` lies strictly to the left of the directed line `a → b`.
#[inline]
#[must_use]
pub fn left_of(c: GridPoint, a: GridPoint, b: GridPoint) -> bool {
    ccw(c, a, b)
}

/// Whether `c` lies strictly to the right of the directed line `a → b`.
#[inline]
#[must_use]
pub fn right_of(c: GridPoint, a: GridPoint, b: GridPoint) -> bool {
    ccw(c, b, a)
}

/// Exact in-circle test: position of `d` relative to the circumcircle of the
/// counterclockwise triangle `(a, b, c)`.
///
/// The sign convention assumes `(a, b, c)` is counterclockwise; callers on a
/// clockwise triangle get the mirrored answer. Coordinates must stay below
/// `1 << 30` for the accumulation to fit `i128`.
#[must_use]
pub fn in_circle(a: GridPoint, b: GridPoint, c: GridPoint, d: GridPoint) -> InCircle {
    let adx = i128::from(a.xi() - d.xi());
    let ady = i128::from(a.yi() - d.yi());
    let bdx = i128::from(b.xi() - d.xi());
    let bdy = i128::from(b.yi() - d.yi());
    let cdx = i128::from(c.xi() - d.xi());
    let cdy = i128::from(c.yi() - d.yi());

    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;

    let det = adx * (bdy * cd - bd * cdy) - ady * (bdx * cd - bd * cdx)
        + ad * (bdx * cdy - bdy * cdx);

    match det.cmp(&0) {
        std::cmp::Ordering::Greater => InCircle::Inside,
        std::cmp::Ordering::Equal => InCircle::On,
        std::cmp::Ordering::Less => InCircle::Outside,
    }
}

/// Strict in-circle containment (ties count as outside).
#[inline]
#[must_use]
pub fn strictly_in_circle(a: GridPoint, b: GridPoint, c: GridPoint, d: GridPoint) -> bool {
    in_circle(a, b, c, d) == InCircle::Inside
}
