//! Event-driven sweep-line controller.
//!
//! The controller consumes the pre-sorted site stream and the circle-event
//! queue, always processing whichever of the two has the smaller `(y, x)`
//! key (ties favor the new site). Site events split a beach arc and create a
//! bisector; circle events remove an arc, finalize two bisectors at the
//! circumcenter and, by duality, emit one Delaunay triangle as an index
//! triple into the caller's output buffer.
//!
//! All run state (arenas, beach line, queue, bounds, counters) lives in one
//! per-run [`SweepContext`], so runs are independent and unit-testable; there
//! is no process-wide state.

use crate::core::arena::{slab_for_sites, Pool, PoolError};
use crate::geometry::point::Point;
use crate::sweep::beachline::BeachLine;
use crate::sweep::bisector::{
    bisect, intersect, region, release_site, set_endpoint, Bisector, BisectorKey, HalfEdge,
    HalfEdgeKey, Side, Site, SiteKey,
};
use crate::sweep::queue::CircleQueue;
use log::debug;
use std::cmp::Ordering;
use thiserror::Error;

/// A Delaunay triangle as indices into the caller's input array.
pub type Triangle = [u32; 3];

/// Errors from the sweep-line engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SweepError {
    /// Fewer than three sites cannot form a triangulation run.
    #[error("at least 3 sites are required, got {found}")]
    TooFewSites {
        /// Number of sites supplied.
        found: usize,
    },
    /// The input stream violates the required `(y, then x)` ascending order.
    #[error("input sites must be sorted by (y, then x) ascending; order breaks at index {index}")]
    UnsortedInput {
        /// First index that is out of order.
        index: usize,
    },
    /// More sites than the `u32` triangle index space can address.
    #[error("site count {found} exceeds the u32 index space")]
    TooManySites {
        /// Number of sites supplied.
        found: usize,
    },
    /// An arena reached its configured slot limit.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EngineState {
    Idle,
    Running,
    Done,
}

/// Per-run sweep state: arenas, beach line, event queue and counters.
///
/// Construct with [`SweepContext::new`], then call [`SweepContext::run`]
/// once; the whole arena set is torn down in bulk when the context drops.
#[derive(Debug)]
pub struct SweepContext<'a> {
    points: &'a [Point],
    cursor: usize,
    sites: Pool<SiteKey, Site>,
    edges: Pool<BisectorKey, Bisector>,
    hes: Pool<HalfEdgeKey, HalfEdge>,
    beach: BeachLine,
    queue: CircleQueue,
    bottom: SiteKey,
    next_edge_id: u32,
    vertex_count: u32,
    state: EngineState,
}

impl<'a> SweepContext<'a> {
    /// Prepares a run over `points`, which must be sorted by `(y, then x)`
    /// ascending; the engine pulls through the stream and performs no sort.
    ///
    /// # Errors
    ///
    /// [`SweepError::TooFewSites`], [`SweepError::TooManySites`] or
    /// [`SweepError::UnsortedInput`] on contract violations; pool exhaustion
    /// is propagated.
    pub fn new(points: &'a [Point]) -> Result<Self, SweepError> {
        let n = points.len();
        if n < 3 {
            return Err(SweepError::TooFewSites { found: n });
        }
        if u32::try_from(n).is_err() {
            return Err(SweepError::TooManySites { found: n });
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[0].cmp_yx(&pair[1]) == Ordering::Greater {
                return Err(SweepError::UnsortedInput { index: i + 1 });
            }
        }

        let (mut xmin, mut xmax) = (points[0].x, points[0].x);
        for p in points {
            xmin = xmin.min(p.x);
            xmax = xmax.max(p.x);
        }
        let ymin = points[0].y;
        let ymax = points[n - 1].y;

        let slab = slab_for_sites(n);
        let mut sites = Pool::new("site", slab);
        let edges = Pool::new("bisector", slab);
        let mut hes = Pool::new("halfedge", slab);

        // The lowest site is the permanent bottom region below every arc.
        let bottom = sites.acquire(Site::generator(points[0], 0))?;
        let beach = BeachLine::new(&mut hes, 2 * slab, xmin, xmax - xmin)?;
        let queue = CircleQueue::new(4 * slab, ymin, ymax - ymin);

        Ok(Self {
            points,
            cursor: 1,
            sites,
            edges,
            hes,
            beach,
            queue,
            bottom,
            next_edge_id: 0,
            vertex_count: 0,
            state: EngineState::Idle,
        })
    }

    /// Pull-style site supplier over the input stream.
    fn next_site(&mut self) -> Result<Option<SiteKey>, SweepError> {
        let Some(&p) = self.points.get(self.cursor) else {
            return Ok(None);
        };
        #[allow(clippy::cast_possible_truncation)]
        let id = self.cursor as u32; // length checked against u32 in new()
        self.cursor += 1;
        let key = self.sites.acquire(Site::generator(p, id))?;
        Ok(Some(key))
    }

    fn left_region(&self, he: HalfEdgeKey) -> SiteKey {
        region(&self.edges, &self.hes[he], Side::Left, self.bottom)
    }

    fn right_region(&self, he: HalfEdgeKey) -> SiteKey {
        region(&self.edges, &self.hes[he], Side::Right, self.bottom)
    }

    /// Runs the sweep to completion, appending emitted triangles to `out`.
    ///
    /// A finished context is inert: calling `run` again is a no-op.
    ///
    /// # Errors
    ///
    /// Pool exhaustion against a configured limit; the run cannot be resumed
    /// after an error.
    pub fn run(&mut self, out: &mut Vec<Triangle>) -> Result<(), SweepError> {
        if self.state == EngineState::Done {
            return Ok(());
        }
        self.state = EngineState::Running;
        debug!("sweep: starting run over {} sites", self.points.len());

        let mut newsite = self.next_site()?;
        loop {
            let pending = self.queue.peek_min(&self.hes, &self.sites);
            let take_site = match (newsite, pending) {
                (None, None) => break,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(s), Some(p)) => {
                    let sp = self.sites[s].point;
                    sp.y < p.y || (sp.y == p.y && sp.x < p.x)
                }
            };
            if take_site {
                if let Some(site) = newsite {
                    self.site_event(site)?;
                }
                newsite = self.next_site()?;
            } else {
                self.circle_event(out)?;
            }
        }

        self.state = EngineState::Done;
        debug!(
            "sweep: done, {} triangles, {} voronoi vertices, {} bisectors",
            out.len(),
            self.vertex_count,
            self.next_edge_id
        );
        Ok(())
    }

    /// A new site splits the arc above it: two half-edges of the bisector
    /// between the site and that arc's region are spliced into the beach
    /// line, and the fresh adjacencies are tested for circle events.
    fn site_event(&mut self, site: SiteKey) -> Result<(), SweepError> {
        let p = self.sites[site].point;

        let lbnd = self
            .beach
            .locate(&mut self.hes, &self.edges, &self.sites, p);
        let rbnd = self.hes[lbnd].right;
        let bot = self.right_region(lbnd);

        let e = bisect(
            &mut self.sites,
            &mut self.edges,
            bot,
            site,
            &mut self.next_edge_id,
        )?;

        let bis = self.hes.acquire(HalfEdge::new(e, Side::Left))?;
        self.beach.insert_after(&mut self.hes, lbnd, bis);
        if let Some(v) = intersect(&self.hes, &self.edges, &self.sites, lbnd, bis) {
            self.queue.delete(&mut self.hes, &mut self.sites, lbnd);
            let vk = self.sites.acquire(Site::vertex(v))?;
            self.queue
                .insert(&mut self.hes, &mut self.sites, lbnd, vk, v.dist(&p));
        }

        let bis2 = self.hes.acquire(HalfEdge::new(e, Side::Right))?;
        self.beach.insert_after(&mut self.hes, bis, bis2);
        if let Some(v) = intersect(&self.hes, &self.edges, &self.sites, bis2, rbnd) {
            let vk = self.sites.acquire(Site::vertex(v))?;
            self.queue
                .insert(&mut self.hes, &mut self.sites, bis2, vk, v.dist(&p));
        }
        Ok(())
    }

    /// The minimum circle event removes its arc, finalizes the two bounding
    /// bisectors at the circumcenter (emitting the dual Delaunay triangle),
    /// bridges the newly adjacent neighbors and re-tests them for events.
    fn circle_event(&mut self, out: &mut Vec<Triangle>) -> Result<(), SweepError> {
        let Some((lbnd, v)) = self.queue.pop_event(&mut self.hes) else {
            return Ok(());
        };
        let llbnd = self.hes[lbnd].left;
        let rbnd = self.hes[lbnd].right;
        let rrbnd = self.hes[rbnd].right;

        let mut bot = self.left_region(lbnd);
        let mut top = self.right_region(rbnd);
        let third = self.right_region(lbnd);
        out.push([self.sites[bot].id, self.sites[top].id, self.sites[third].id]);

        // The candidate circumcenter is now a resolved Voronoi vertex.
        self.sites[v].id = self.vertex_count;
        self.vertex_count += 1;

        let (le_edge, le_side) = {
            let h = &self.hes[lbnd];
            (h.bisector, h.side)
        };
        set_endpoint(&mut self.edges, &mut self.sites, le_edge, le_side, v);
        let (re_edge, re_side) = {
            let h = &self.hes[rbnd];
            (h.bisector, h.side)
        };
        set_endpoint(&mut self.edges, &mut self.sites, re_edge, re_side, v);

        self.beach.delete(&mut self.hes, lbnd);
        self.queue.delete(&mut self.hes, &mut self.sites, rbnd);
        self.beach.delete(&mut self.hes, rbnd);

        // Bridge the newly adjacent regions with a fresh bisector; its
        // orientation depends on which region sits lower.
        let mut side = Side::Left;
        if self.sites[bot].point.y > self.sites[top].point.y {
            std::mem::swap(&mut bot, &mut top);
            side = Side::Right;
        }
        let e = bisect(
            &mut self.sites,
            &mut self.edges,
            bot,
            top,
            &mut self.next_edge_id,
        )?;
        let bis = self.hes.acquire(HalfEdge::new(e, side))?;
        self.beach.insert_after(&mut self.hes, llbnd, bis);
        set_endpoint(&mut self.edges, &mut self.sites, e, side.opposite(), v);
        release_site(&mut self.sites, v);

        let botp = self.sites[bot].point;
        if let Some(p) = intersect(&self.hes, &self.edges, &self.sites, llbnd, bis) {
            self.queue.delete(&mut self.hes, &mut self.sites, llbnd);
            let vk = self.sites.acquire(Site::vertex(p))?;
            self.queue
                .insert(&mut self.hes, &mut self.sites, llbnd, vk, p.dist(&botp));
        }
        if let Some(p) = intersect(&self.hes, &self.edges, &self.sites, bis, rrbnd) {
            let vk = self.sites.acquire(Site::vertex(p))?;
            self.queue
                .insert(&mut self.hes, &mut self.sites, bis, vk, p.dist(&botp));
        }
        Ok(())
    }
}

/// Triangulates a `(y, then x)`-sorted site stream, returning Delaunay
/// triangles as index triples into `points`.
///
/// Fewer than three points yield an empty triangulation; colinear points
/// yield zero triangles without error.
///
/// # Errors
///
/// [`SweepError::UnsortedInput`] or [`SweepError::TooManySites`] on contract
/// violations; pool exhaustion is propagated.
pub fn triangulate(points: &[Point]) -> Result<Vec<Triangle>, SweepError> {
    if points.len() < 3 {
        return Ok(Vec::new());
    }
    let mut cx = SweepContext::new(points)?;
    let mut out = Vec::with_capacity(2 * points.len());
    cx.run(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_square_splits_along_one_diagonal() {
        let sites = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ];
        let tris = triangulate(&sites).unwrap();
        assert_eq!(tris.len(), 2);

        // Deterministic tie-break: repeated runs pick the same diagonal.
        for _ in 0..10 {
            assert_eq!(triangulate(&sites).unwrap(), tris);
        }
    }

    #[test]
    fn colinear_sites_yield_zero_triangles() {
        let sites = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        assert_eq!(triangulate(&sites).unwrap(), Vec::<Triangle>::new());
    }

    #[test]
    fn fewer_than_three_sites_is_empty_not_an_error() {
        assert!(triangulate(&[]).unwrap().is_empty());
        assert!(triangulate(&[Point::new(0.0, 0.0)]).unwrap().is_empty());
        assert!(triangulate(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unsorted_input_is_rejected() {
        let sites = vec![
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert_eq!(
            triangulate(&sites).unwrap_err(),
            SweepError::UnsortedInput { index: 1 }
        );
    }

    #[test]
    fn simple_triangle_emits_itself() {
        let sites = vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        let tris = triangulate(&sites).unwrap();
        assert_eq!(tris.len(), 1);
        let mut t = tris[0];
        t.sort_unstable();
        assert_eq!(t, [0, 1, 2]);
    }

    #[test]
    fn finished_context_is_inert() {
        let sites = vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        let mut cx = SweepContext::new(&sites).unwrap();
        let mut out = Vec::new();
        cx.run(&mut out).unwrap();
        assert_eq!(out.len(), 1);
        cx.run(&mut out).unwrap();
        assert_eq!(out.len(), 1); // no double emission
    }
}
