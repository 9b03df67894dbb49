//! Incremental point removal and star-hole retriangulation.
//!
//! Removing a point detaches its star: every edge of the origin ring is
//! excised and the cell is marked dead, leaving a star-shaped hole bounded by
//! the former link of the point. Retriangulation fills that hole by Delaunay
//! ear clipping: an ear is a convex boundary corner whose circumcircle holds
//! no other hole vertex, and each clip bridges one diagonal.
//!
//! A point on the convex hull is recognized by the >=180° angular gap in its
//! ring. Its link is an open chain rather than a closed polygon, so clipping
//! starts just past the gap and never bridges the open side; concave ends of
//! the chain simply become new hull boundary.

use crate::core::collections::SmallBuffer;
use crate::geometry::point::GridPoint;
use crate::geometry::predicates::{ccw, cross, strictly_in_circle};
use crate::quadedge::mesh::{EdgeKey, GridError, GridMesh, Mesh};
use crate::quadedge::topology::{bridge, dest, lnext, onext, orig, remove_edge, sym};
use log::{trace, warn};

impl GridMesh {
    /// Detaches `p` from the mesh, removing every incident edge. Returns
    /// `false` (a no-op) when `p` is not live; an isolated live point is
    /// simply marked dead.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] when `p` is off the lattice.
    pub fn remove_point(&mut self, p: GridPoint) -> Result<bool, GridError> {
        self.bounds_check(p)?;
        if !self.is_live(p) {
            return Ok(false);
        }
        let ring = self.star_ring(p);
        for &e in &ring {
            remove_edge(self, e);
        }
        self.mark_live(p, false);
        trace!("grid: removed {p} ({} incident edges)", ring.len());
        Ok(true)
    }

    /// Detaches `p` and retriangulates the star-shaped hole it leaves.
    /// Returns `false` (a no-op) when `p` is not live.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] when `p` is off the lattice; edge-arena
    /// exhaustion is propagated.
    pub fn remove_and_retriangulate(&mut self, p: GridPoint) -> Result<bool, GridError> {
        self.bounds_check(p)?;
        if !self.is_live(p) {
            return Ok(false);
        }
        let ring = self.star_ring(p);
        if ring.len() < 3 {
            // One or two neighbors leave no hole to fill.
            for &e in &ring {
                remove_edge(self, e);
            }
            self.mark_live(p, false);
            return Ok(true);
        }

        // Capture the hole boundary while the star still pins it: the left
        // face of each ring edge is a link triangle, so lnext yields the
        // boundary edge opposite p.
        let gap = self.hull_gap(p, &ring);
        let k = ring.len();
        let mut chain: Vec<EdgeKey> = Vec::with_capacity(k);
        match gap {
            None => {
                for &e in &ring {
                    chain.push(lnext(self, e));
                }
            }
            Some(g) => {
                // Open chain: skip the ring pair spanning the hull gap.
                for t in 1..k {
                    chain.push(lnext(self, ring[(g + t) % k]));
                }
            }
        }

        for &e in &ring {
            remove_edge(self, e);
        }
        self.mark_live(p, false);

        match gap {
            None => self.fill_closed_hole(&mut chain)?,
            Some(_) => self.fill_open_chain(&mut chain)?,
        }
        Ok(true)
    }

    /// The counterclockwise origin ring of `p`, empty for an isolated point.
    fn star_ring(&self, p: GridPoint) -> SmallBuffer<EdgeKey, 8> {
        let mut ring = SmallBuffer::new();
        let Some(start) = self.edge_out(p) else {
            return ring;
        };
        let mut e = start;
        loop {
            ring.push(e);
            e = onext(self, e);
            if e == start {
                break;
            }
        }
        ring
    }

    /// Index of the ring pair whose angular gap reaches 180° or more, which
    /// marks `p` as a hull point. `None` for interior points.
    fn hull_gap(&self, p: GridPoint, ring: &[EdgeKey]) -> Option<usize> {
        let k = ring.len();
        (0..k).find(|&i| {
            let a = dest(self, ring[i]);
            let b = dest(self, ring[(i + 1) % k]);
            cross(p, a, b) <= 0
        })
    }

    fn fill_closed_hole(&mut self, chain: &mut Vec<EdgeKey>) -> Result<(), GridError> {
        while chain.len() > 3 {
            let Some(i) = self.find_ear(chain, true) else {
                // A closed star hole always has an ear; a miss means the
                // boundary capture went wrong upstream.
                warn!(
                    "grid: closed hole left with {} unfilled boundary edges",
                    chain.len()
                );
                break;
            };
            self.clip_ear(chain, i)?;
        }
        Ok(())
    }

    fn fill_open_chain(&mut self, chain: &mut Vec<EdgeKey>) -> Result<(), GridError> {
        while chain.len() >= 2 {
            let Some(i) = self.find_ear(chain, false) else {
                // No convex Delaunay ear left: the rest of the chain is new
                // hull boundary.
                break;
            };
            self.clip_ear(chain, i)?;
        }
        Ok(())
    }

    /// Finds a chain position whose corner is convex and whose circumcircle
    /// contains no other hole vertex.
    fn find_ear(&self, chain: &[EdgeKey], closed: bool) -> Option<usize> {
        let n = chain.len();
        let mut verts: SmallBuffer<GridPoint, 8> =
            chain.iter().map(|&e| orig(self, e)).collect();
        if !closed {
            verts.push(dest(self, *chain.last()?));
        }

        let pairs = if closed { n } else { n - 1 };
        (0..pairs).find(|&i| {
            let a = chain[i];
            let b = chain[(i + 1) % n];
            let u = orig(self, a);
            let v = orig(self, b);
            let w = dest(self, b);
            if !ccw(u, v, w) {
                return false;
            }
            verts
                .iter()
                .filter(|&&x| x != u && x != v && x != w)
                .all(|&x| !strictly_in_circle(u, v, w, x))
        })
    }

    /// Bridges the diagonal across the corner at `i`, replacing two chain
    /// edges by the remaining side of the new triangle.
    fn clip_ear(&mut self, chain: &mut Vec<EdgeKey>, i: usize) -> Result<(), GridError> {
        let n = chain.len();
        let j = (i + 1) % n;
        let a = chain[i];
        let b = chain[j];
        let c = bridge(self, b, a)?;
        chain[i] = sym(self, c);
        chain.remove(j);
        Ok(())
    }
}
