//! Divide-and-conquer construction of the grid triangulation.
//!
//! The point set is split recursively at the median of whichever axis the
//! current bounding box is widest in, so elongated regions are always cut
//! across their long side. Splits along the row axis reuse the column-axis
//! machinery through a quarter-turn change of frame: ordering by
//! `(row, reversed col)` is ordering by x in the rotated frame `(y, -x)`, and
//! the rotation preserves orientation, so the orientation and in-circle
//! predicates need no adjustment.
//!
//! Each half is triangulated recursively (two- and three-point base cases),
//! then stitched by the classic tangent merge: find the lower common tangent,
//! bridge it, and zip upward choosing the next cross edge by the in-circle
//! criterion. Only strict containment deletes an edge, so cocircular
//! configurations keep whatever diagonal the merge order produced, the same
//! one on every run.
//!
//! Threaded construction forks the recursion with [`rayon::join`]; each task
//! builds a private [`Fragment`] mesh, and the sequential merge at each join
//! point first absorbs the right fragment into the left. Fragments are
//! disjoint by construction, so no locks are involved.

use crate::core::arena::{slab_for_sites, Pool, PoolError};
use crate::core::collections::FastHashMap;
use crate::geometry::point::GridPoint;
use crate::geometry::predicates::{ccw, strictly_in_circle};
use crate::quadedge::mesh::{DirEdge, EdgeKey, GridError, GridMesh, Mesh};
use crate::quadedge::topology::{
    add_edge, bridge, dest, lnext, onext, oprev, orig, remove_edge, rprev, sym, weld,
};
use log::debug;
use slotmap::Key;
use std::cmp::Ordering;

/// Below this many points the threaded build stays on one thread.
const FORK_CUTOFF: usize = 256;

/// Split axis for one recursion level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Col,
    Row,
}

impl Axis {
    /// Axis of the longest bounding-box side of `pts`.
    fn for_span(pts: &[GridPoint]) -> Self {
        let mut min = pts[0];
        let mut max = pts[0];
        for p in pts {
            min.col = min.col.min(p.col);
            min.row = min.row.min(p.row);
            max.col = max.col.max(p.col);
            max.row = max.row.max(p.row);
        }
        if max.col - min.col >= max.row - min.row {
            Axis::Col
        } else {
            Axis::Row
        }
    }

    /// Lexicographic order along this axis; the row axis orders by the
    /// rotated frame `(row, reversed col)`.
    fn cmp(self, a: GridPoint, b: GridPoint) -> Ordering {
        match self {
            Axis::Col => a.col.cmp(&b.col).then(a.row.cmp(&b.row)),
            Axis::Row => a.row.cmp(&b.row).then(b.col.cmp(&a.col)),
        }
    }
}

fn left_of_edge<M: Mesh>(m: &M, p: GridPoint, e: EdgeKey) -> bool {
    ccw(p, orig(m, e), dest(m, e))
}

fn right_of_edge<M: Mesh>(m: &M, p: GridPoint, e: EdgeKey) -> bool {
    ccw(p, dest(m, e), orig(m, e))
}

/// Whether a candidate cross edge still reaches above the base edge.
fn above_base<M: Mesh>(m: &M, cand: EdgeKey, basel: EdgeKey) -> bool {
    right_of_edge(m, dest(m, cand), basel)
}

/// Walks the hull from any counterclockwise hull edge and returns
/// `(le, re)`: the counterclockwise hull edge out of the axis-minimal vertex
/// and the clockwise hull edge out of the axis-maximal vertex.
fn extreme_edges<M: Mesh>(m: &M, start: EdgeKey, axis: Axis) -> (EdgeKey, EdgeKey) {
    let mut le = start;
    let mut lo = orig(m, start);
    let mut re = sym(m, start);
    let mut hi = dest(m, start);

    let mut e = rprev(m, start);
    while e != start {
        let o = orig(m, e);
        if axis.cmp(o, lo) == Ordering::Less {
            lo = o;
            le = e;
        }
        let d = dest(m, e);
        if axis.cmp(d, hi) == Ordering::Greater {
            hi = d;
            re = sym(m, e);
        }
        e = rprev(m, e);
    }
    (le, re)
}

/// Triangulates `pts` (at least two, distinct) into `m`, returning one
/// counterclockwise hull edge of the result.
fn build<M: Mesh>(m: &mut M, pts: &mut [GridPoint]) -> Result<EdgeKey, GridError> {
    debug_assert!(pts.len() >= 2);
    let axis = Axis::for_span(pts);

    if pts.len() <= 3 {
        pts.sort_unstable_by(|a, b| axis.cmp(*a, *b));
        return base_case(m, pts);
    }

    let mid = pts.len() / 2;
    pts.select_nth_unstable_by(mid, |a, b| axis.cmp(*a, *b));
    let (lo, hi) = pts.split_at_mut(mid);
    let lh = build(m, lo)?;
    let rh = build(m, hi)?;
    merge(m, lh, rh, axis)
}

/// Two- and three-point bases over an axis-sorted slice.
fn base_case<M: Mesh>(m: &mut M, pts: &[GridPoint]) -> Result<EdgeKey, GridError> {
    if pts.len() == 2 {
        let e = add_edge(m, pts[0], pts[1])?;
        return Ok(e);
    }

    let (p1, p2, p3) = (pts[0], pts[1], pts[2]);
    let a = add_edge(m, p1, p2)?;
    let b = add_edge(m, p2, p3)?;
    let sa = sym(m, a);
    weld(m, sa, b);

    if ccw(p1, p2, p3) {
        bridge(m, b, a)?;
        Ok(a)
    } else if ccw(p1, p3, p2) {
        let c = bridge(m, b, a)?;
        Ok(sym(m, c))
    } else {
        // Colinear chain: no face to close.
        Ok(a)
    }
}

/// Stitches two triangulated halves separated along `axis`, returning the
/// final base edge (the upper common tangent, a hull edge).
fn merge<M: Mesh>(m: &mut M, lh: EdgeKey, rh: EdgeKey, axis: Axis) -> Result<EdgeKey, GridError> {
    let (_, mut ldi) = extreme_edges(m, lh, axis);
    let (mut rdi, _) = extreme_edges(m, rh, axis);

    // Lower common tangent: descend both hulls until neither half has a
    // vertex below the candidate segment.
    loop {
        if left_of_edge(m, orig(m, rdi), ldi) {
            ldi = lnext(m, ldi);
        } else if right_of_edge(m, orig(m, ldi), rdi) {
            rdi = rprev(m, rdi);
        } else {
            break;
        }
    }

    let srdi = sym(m, rdi);
    let mut basel = bridge(m, srdi, ldi)?;

    // Zip upward. Each pass picks the candidate whose circumcircle is empty
    // and bridges it to the opposite base endpoint; candidate edges whose
    // circumcircle would contain the next candidate are no longer Delaunay
    // and are deleted before the choice.
    loop {
        let mut lcand = onext(m, sym(m, basel));
        if above_base(m, lcand, basel) {
            loop {
                let next = onext(m, lcand);
                if !strictly_in_circle(
                    dest(m, basel),
                    orig(m, basel),
                    dest(m, lcand),
                    dest(m, next),
                ) {
                    break;
                }
                remove_edge(m, lcand);
                lcand = next;
            }
        }

        let mut rcand = oprev(m, basel);
        if above_base(m, rcand, basel) {
            loop {
                let prev = oprev(m, rcand);
                if !strictly_in_circle(
                    dest(m, basel),
                    orig(m, basel),
                    dest(m, rcand),
                    dest(m, prev),
                ) {
                    break;
                }
                remove_edge(m, rcand);
                rcand = prev;
            }
        }

        let lvalid = above_base(m, lcand, basel);
        let rvalid = above_base(m, rcand, basel);
        if !lvalid && !rvalid {
            // Upper tangent reached.
            break;
        }
        if !lvalid
            || (rvalid
                && strictly_in_circle(
                    dest(m, lcand),
                    orig(m, lcand),
                    orig(m, rcand),
                    dest(m, rcand),
                ))
        {
            let sb = sym(m, basel);
            basel = bridge(m, rcand, sb)?;
        } else {
            let sb = sym(m, basel);
            let sl = sym(m, lcand);
            basel = bridge(m, sb, sl)?;
        }
    }
    Ok(basel)
}

/// Private mesh a fork-join task builds into: an edge arena plus a hash-map
/// of per-point entry edges (a fragment has no lattice of its own).
#[derive(Debug)]
struct Fragment {
    edges: Pool<EdgeKey, DirEdge>,
    out: FastHashMap<GridPoint, EdgeKey>,
}

impl Fragment {
    fn for_points(n: usize) -> Self {
        Self {
            edges: Pool::new("edge", slab_for_sites(n)),
            out: FastHashMap::default(),
        }
    }
}

impl Mesh for Fragment {
    fn edges(&self) -> &Pool<EdgeKey, DirEdge> {
        &self.edges
    }

    fn edges_mut(&mut self) -> &mut Pool<EdgeKey, DirEdge> {
        &mut self.edges
    }

    fn edge_out(&self, p: GridPoint) -> Option<EdgeKey> {
        self.out.get(&p).copied()
    }

    fn set_edge_out(&mut self, p: GridPoint, e: Option<EdgeKey>) {
        match e {
            Some(e) => {
                self.out.insert(p, e);
            }
            None => {
                self.out.remove(&p);
            }
        }
    }
}

/// Moves every edge of `frag` into `dst`, rewriting keys, and returns the
/// remapped counterpart of `hull`. The two meshes cover disjoint point sets.
fn absorb_into<M: Mesh>(dst: &mut M, frag: Fragment, hull: EdgeKey) -> Result<EdgeKey, PoolError> {
    let mut map: FastHashMap<EdgeKey, EdgeKey> = FastHashMap::default();
    for (k, de) in frag.edges.iter() {
        let nk = dst.edges_mut().acquire(DirEdge {
            orig: de.orig,
            twin: EdgeKey::null(),
            onext: EdgeKey::null(),
        })?;
        map.insert(k, nk);
    }
    for (k, de) in frag.edges.iter() {
        let nk = map[&k];
        let d = &mut dst.edges_mut()[nk];
        d.twin = map[&de.twin];
        d.onext = map[&de.onext];
    }
    for (p, e) in frag.out {
        dst.set_edge_out(p, Some(map[&e]));
    }
    Ok(map[&hull])
}

/// Fork-join recursion: splits like the sequential build, but each half is
/// triangulated into a private fragment on its own task; the merge is the
/// join barrier.
fn build_threaded(
    pts: &mut [GridPoint],
    depth: u32,
    cutoff: usize,
) -> Result<(Fragment, EdgeKey), GridError> {
    if depth == 0 || pts.len() <= cutoff.max(4) {
        let mut frag = Fragment::for_points(pts.len());
        let hull = build(&mut frag, pts)?;
        return Ok((frag, hull));
    }

    let axis = Axis::for_span(pts);
    let mid = pts.len() / 2;
    pts.select_nth_unstable_by(mid, |a, b| axis.cmp(*a, *b));
    let (lo, hi) = pts.split_at_mut(mid);

    let (left, right) = rayon::join(
        || build_threaded(lo, depth - 1, cutoff),
        || build_threaded(hi, depth - 1, cutoff),
    );
    let (mut lfrag, lh) = left?;
    let (rfrag, rh) = right?;

    let rh = absorb_into(&mut lfrag, rfrag, rh)?;
    let hull = merge(&mut lfrag, lh, rh, axis)?;
    Ok((lfrag, hull))
}

impl GridMesh {
    /// Replaces the mesh contents with a Delaunay triangulation of `points`.
    /// Duplicates are collapsed; fewer than two distinct points produce a
    /// mesh with no edges.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] for points off the lattice; arena
    /// exhaustion is propagated.
    pub fn triangulate(&mut self, points: &[GridPoint]) -> Result<(), GridError> {
        let mut work = self.prepare(points)?;
        if work.len() >= 2 {
            build(self, &mut work)?;
        }
        debug!(
            "grid: triangulated {} points into {} directed edges",
            work.len(),
            self.edge_count()
        );
        Ok(())
    }

    /// Like [`GridMesh::triangulate`], but forks the recursive phase across
    /// the rayon pool. Small inputs fall back to the sequential build.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GridMesh::triangulate`].
    pub fn triangulate_threaded(&mut self, points: &[GridPoint]) -> Result<(), GridError> {
        let mut work = self.prepare(points)?;
        if work.len() < 2 {
            return Ok(());
        }
        if work.len() <= FORK_CUTOFF {
            build(self, &mut work)?;
            return Ok(());
        }

        let threads = rayon::current_num_threads();
        let depth = usize::BITS - threads.next_power_of_two().leading_zeros();
        debug!(
            "grid: threaded build of {} points, fork depth {depth}",
            work.len()
        );
        let (frag, hull) = build_threaded(&mut work, depth, FORK_CUTOFF)?;
        absorb_into(self, frag, hull)?;
        Ok(())
    }

    /// Bounds-checks, resets the mesh, and marks the deduplicated working
    /// set live.
    fn prepare(&mut self, points: &[GridPoint]) -> Result<Vec<GridPoint>, GridError> {
        for &p in points {
            self.bounds_check(p)?;
        }
        self.reset();
        let mut work = points.to_vec();
        work.sort_unstable();
        work.dedup();
        for &p in &work {
            self.mark_live(p, true);
        }
        Ok(work)
    }
}
