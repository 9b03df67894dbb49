//! Sites, bisector lines and beach-line half-edges for the sweep engine.
//!
//! A [`Bisector`] stores the perpendicular bisector of two generator sites as
//! the implicit line `a·x + b·y = c`, normalized so that the dominant-axis
//! coefficient is exactly `1.0` (`a == 1` when the generators differ more in
//! x, `b == 1` otherwise). A [`HalfEdge`] is one oriented side of a bisector;
//! it is simultaneously a node of the beach-line sequence and of the
//! circle-event queue.
//!
//! Sites are reference counted: every edge holding a site as generator or
//! endpoint, and every queued event holding a candidate vertex, owns one
//! reference. A site's slot is released back to the arena exactly when its
//! count reaches zero; the timing of that release is load-bearing for slot
//! reuse and is validated by tests.
//!
//! The comparison operators in [`right_of`] and [`intersect`] (`>=` vs `>`,
//! and the `1e-10` parallel-line epsilon) are a fixed behavioral contract:
//! changing any of them changes output on degenerate inputs.

use crate::core::arena::{Pool, PoolError};
use crate::geometry::point::Point;
use slotmap::{new_key_type, Key};

new_key_type! {
    /// Arena key for a [`Site`].
    pub struct SiteKey;
    /// Arena key for a [`Bisector`].
    pub struct BisectorKey;
    /// Arena key for a [`HalfEdge`].
    pub struct HalfEdgeKey;
}

/// Determinant threshold below which two bisectors are treated as parallel
/// and never produce a circle event.
pub const PARALLEL_EPSILON: f64 = 1.0e-10;

/// Which side of its bisector a half-edge lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Left of the bisector line.
    Left = 0,
    /// Right of the bisector line.
    Right = 1,
}

impl Side {
    /// The opposite side.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// A generator site or Voronoi vertex, with its reference count.
#[derive(Clone, Debug)]
pub struct Site {
    /// Position (the `z` coordinate is carried through, never read).
    pub point: Point,
    /// Input index for generator sites; Voronoi vertex number once resolved.
    pub id: u32,
    pub(crate) refs: u32,
}

impl Site {
    /// A generator site read from the input stream.
    #[must_use]
    pub const fn generator(point: Point, id: u32) -> Self {
        Self {
            point,
            id,
            refs: 0,
        }
    }

    /// A candidate Voronoi vertex produced by a bisector intersection. Its
    /// id is assigned when the corresponding circle event resolves.
    #[must_use]
    pub const fn vertex(point: Point) -> Self {
        Self {
            point,
            id: 0,
            refs: 0,
        }
    }

    /// Current reference count (exposed for ownership tests).
    #[must_use]
    pub const fn refs(&self) -> u32 {
        self.refs
    }
}

/// Takes one reference on `site`.
pub(crate) fn retain_site(sites: &mut Pool<SiteKey, Site>, site: SiteKey) {
    sites[site].refs += 1;
}

/// Drops one reference on `site`, releasing its slot at zero.
pub(crate) fn release_site(sites: &mut Pool<SiteKey, Site>, site: SiteKey) {
    let refs = &mut sites[site].refs;
    *refs -= 1;
    if *refs == 0 {
        sites.release(site);
    }
}

/// The perpendicular bisector of two sites: the implicit line
/// `a·x + b·y = c`, dominant-axis normalized.
#[derive(Clone, Debug)]
pub struct Bisector {
    /// x coefficient (exactly `1.0` when x is the dominant axis).
    pub a: f64,
    /// y coefficient (exactly `1.0` when y is the dominant axis).
    pub b: f64,
    /// Line constant.
    pub c: f64,
    /// Generator sites: `regions[0]` below/left, `regions[1]` the newer site.
    pub regions: [SiteKey; 2],
    /// Endpoint sites bounding the finished Voronoi segment, set by circle
    /// events. Once both are set the edge is finalized and released.
    pub ends: [Option<SiteKey>; 2],
    /// Creation sequence number.
    pub id: u32,
}

/// One oriented side of a bisector: a beach-line node and, when scheduled,
/// a circle-event queue node.
#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// The underlying bisector; null for the beach-line sentinels.
    pub bisector: BisectorKey,
    /// Orientation relative to the bisector line.
    pub side: Side,
    /// Beach-line neighbor to the left (self for the left sentinel).
    pub left: HalfEdgeKey,
    /// Beach-line neighbor to the right (self for the right sentinel).
    pub right: HalfEdgeKey,
    /// Tombstone: unlinked from the beach line but possibly still referenced
    /// by a hash bucket.
    pub deleted: bool,
    /// Number of hash buckets currently caching this node.
    pub hash_refs: u32,
    /// Candidate circle-event vertex, while queued.
    pub vertex: Option<SiteKey>,
    /// Delayed queue key: vertex y plus the circumradius offset.
    pub ystar: f64,
    /// Next node in the same queue bucket.
    pub qnext: Option<HalfEdgeKey>,
}

impl HalfEdge {
    /// A beach-line node for one side of `bisector`.
    #[must_use]
    pub fn new(bisector: BisectorKey, side: Side) -> Self {
        Self {
            bisector,
            side,
            left: HalfEdgeKey::null(),
            right: HalfEdgeKey::null(),
            deleted: false,
            hash_refs: 0,
            vertex: None,
            ystar: 0.0,
            qnext: None,
        }
    }

    /// A beach-line sentinel (no bisector).
    #[must_use]
    pub fn sentinel() -> Self {
        Self::new(BisectorKey::null(), Side::Left)
    }
}

/// Creates the bisector of `s1` and `s2`, taking a generator reference on
/// each.
///
/// # Errors
///
/// Propagates pool exhaustion.
pub(crate) fn bisect(
    sites: &mut Pool<SiteKey, Site>,
    edges: &mut Pool<BisectorKey, Bisector>,
    s1: SiteKey,
    s2: SiteKey,
    next_id: &mut u32,
) -> Result<BisectorKey, PoolError> {
    retain_site(sites, s1);
    retain_site(sites, s2);
    let p1 = sites[s1].point;
    let p2 = sites[s2].point;

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let adx = dx.abs();
    let ady = dy.abs();
    let c = p1.x * dx + p1.y * dy + (dx * dx + dy * dy) * 0.5;

    let (a, b, c) = if adx > ady {
        (1.0, dy / dx, c / dx)
    } else {
        (dx / dy, 1.0, c / dy)
    };

    let id = *next_id;
    *next_id += 1;
    edges.acquire(Bisector {
        a,
        b,
        c,
        regions: [s1, s2],
        ends: [None, None],
        id,
    })
}

/// Region of a half-edge on its given side, i.e. the generator site whose
/// beach arc the half-edge bounds. Sentinels map to `bottom`.
#[must_use]
pub(crate) fn region(
    edges: &Pool<BisectorKey, Bisector>,
    he: &HalfEdge,
    side: Side,
    bottom: SiteKey,
) -> SiteKey {
    if he.bisector.is_null() {
        return bottom;
    }
    let e = &edges[he.bisector];
    match (he.side, side) {
        (Side::Left, Side::Left) | (Side::Right, Side::Right) => e.regions[0],
        _ => e.regions[1],
    }
}

/// Decides whether `p` lies to the right of `el`'s bisector.
///
/// A fast closed-form sign test along the dominant axis answers unambiguous
/// configurations; near-degenerate ones fall back to a squared-distance
/// comparison. The branch structure and every comparison operator follow the
/// reference exactly.
#[must_use]
pub(crate) fn right_of(
    edges: &Pool<BisectorKey, Bisector>,
    sites: &Pool<SiteKey, Site>,
    el: &HalfEdge,
    p: Point,
) -> bool {
    let e = &edges[el.bisector];
    let topsite = sites[e.regions[1]].point;
    let right_of_site = p.x > topsite.x;

    if right_of_site && el.side == Side::Left {
        return true;
    }
    if !right_of_site && el.side == Side::Right {
        return false;
    }

    let above;
    if e.a == 1.0 {
        let dyp = p.y - topsite.y;
        let dxp = p.x - topsite.x;
        let mut fast = false;
        let mut above_tmp;
        if (!right_of_site && e.b < 0.0) || (right_of_site && e.b >= 0.0) {
            above_tmp = dyp >= e.b * dxp;
            fast = above_tmp;
        } else {
            above_tmp = p.x + p.y * e.b > e.c;
            if e.b < 0.0 {
                above_tmp = !above_tmp;
            }
            if !above_tmp {
                fast = true;
            }
        }
        if fast {
            above = above_tmp;
        } else {
            let bottom = sites[e.regions[0]].point;
            let dxs = topsite.x - bottom.x;
            let mut slow =
                e.b * (dxp * dxp - dyp * dyp) < dxs * dyp * (1.0 + 2.0 * dxp / dxs + e.b * e.b);
            if e.b < 0.0 {
                slow = !slow;
            }
            above = slow;
        }
    } else {
        // e.b == 1.0
        let yl = e.c - e.a * p.x;
        let t1 = p.y - yl;
        let t2 = p.x - topsite.x;
        let t3 = yl - topsite.y;
        above = t1 * t1 > t2 * t2 + t3 * t3;
    }

    if el.side == Side::Left {
        above
    } else {
        !above
    }
}

/// Intersects the bisectors of two adjacent beach-line half-edges.
///
/// Returns the candidate Voronoi vertex, or `None` when the edges share a
/// newer region, are parallel within [`PARALLEL_EPSILON`], or the
/// intersection falls on the wrong side of the triggering arc. All of these
/// are normal outcomes, never faults.
#[must_use]
pub(crate) fn intersect(
    hes: &Pool<HalfEdgeKey, HalfEdge>,
    edges: &Pool<BisectorKey, Bisector>,
    sites: &Pool<SiteKey, Site>,
    el1: HalfEdgeKey,
    el2: HalfEdgeKey,
) -> Option<Point> {
    let h1 = &hes[el1];
    let h2 = &hes[el2];
    if h1.bisector.is_null() || h2.bisector.is_null() {
        return None;
    }
    let e1 = &edges[h1.bisector];
    let e2 = &edges[h2.bisector];
    if e1.regions[1] == e2.regions[1] {
        return None;
    }

    let d = e1.a * e2.b - e1.b * e2.a;
    if -PARALLEL_EPSILON < d && d < PARALLEL_EPSILON {
        return None;
    }

    let xint = (e1.c * e2.b - e2.c * e1.b) / d;
    let yint = (e2.c * e1.a - e1.c * e2.a) / d;

    let r1 = sites[e1.regions[1]].point;
    let r2 = sites[e2.regions[1]].point;
    let (el, e) = if r1.y < r2.y || (r1.y == r2.y && r1.x < r2.x) {
        (h1, e1)
    } else {
        (h2, e2)
    };

    let right_of_site = xint >= sites[e.regions[1]].point.x;
    if (right_of_site && el.side == Side::Left) || (!right_of_site && el.side == Side::Right) {
        return None;
    }

    Some(Point::new(xint, yint))
}

/// Sets one endpoint of `edge`, taking a reference on `s`.
///
/// When this closes the segment (both endpoints set), the edge's two
/// generator references are released immediately and the edge slot is
/// returned to the arena. Returns whether the edge was finalized.
pub(crate) fn set_endpoint(
    edges: &mut Pool<BisectorKey, Bisector>,
    sites: &mut Pool<SiteKey, Site>,
    edge: BisectorKey,
    side: Side,
    s: SiteKey,
) -> bool {
    let Some(e) = edges.get_mut(edge) else {
        return false;
    };
    e.ends[side.index()] = Some(s);
    retain_site(sites, s);
    if e.ends[side.opposite().index()].is_none() {
        return false;
    }
    let [r0, r1] = e.regions;
    release_site(sites, r0);
    release_site(sites, r1);
    edges.release(edge);
    true
}
