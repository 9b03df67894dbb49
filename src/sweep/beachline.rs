//! Beach-line status structure: the sweep's ordered cross-section.
//!
//! The beach line is a doubly-linked sequence of half-edges between two
//! sentinel ends, ordered left to right by current x at the sweep y. A hash
//! table of `2·⌊√(N+4)⌋` buckets maps x linearly onto the sequence so that
//! [`BeachLine::locate`] is amortized O(1) once warm and O(√N) cold.
//!
//! Deleted nodes are tombstoned rather than freed: a hash bucket may still
//! cache them, so the slot is reclaimed lazily when a probe encounters the
//! tombstone and its bucket reference count drops to zero.

use crate::core::arena::{Pool, PoolError};
use crate::geometry::point::Point;
use crate::sweep::bisector::{right_of, Bisector, BisectorKey, HalfEdge, HalfEdgeKey, Site, SiteKey};

/// Ordered beach-line sequence with its hash-assisted search index.
#[derive(Debug)]
pub struct BeachLine {
    hash: Vec<Option<HalfEdgeKey>>,
    /// Left sentinel (self-linked on its outer side).
    pub leftend: HalfEdgeKey,
    /// Right sentinel (self-linked on its outer side).
    pub rightend: HalfEdgeKey,
    xmin: f64,
    deltax: f64,
}

impl BeachLine {
    /// Creates an empty beach line for a run whose sites span
    /// `[xmin, xmin + deltax]`, with `hash_size` buckets.
    ///
    /// # Errors
    ///
    /// Propagates pool exhaustion while allocating the sentinels.
    pub fn new(
        hes: &mut Pool<HalfEdgeKey, HalfEdge>,
        hash_size: usize,
        xmin: f64,
        deltax: f64,
    ) -> Result<Self, PoolError> {
        let hash_size = hash_size.max(2);
        let mut hash = vec![None; hash_size];

        let leftend = hes.acquire(HalfEdge::sentinel())?;
        let rightend = hes.acquire(HalfEdge::sentinel())?;
        {
            let le = &mut hes[leftend];
            le.left = leftend;
            le.right = rightend;
        }
        {
            let re = &mut hes[rightend];
            re.left = leftend;
            re.right = rightend;
        }
        hash[0] = Some(leftend);
        hash[hash_size - 1] = Some(rightend);

        Ok(Self {
            hash,
            leftend,
            rightend,
            xmin,
            deltax,
        })
    }

    /// Splices `new` immediately right of `lb`.
    pub fn insert_after(
        &self,
        hes: &mut Pool<HalfEdgeKey, HalfEdge>,
        lb: HalfEdgeKey,
        new: HalfEdgeKey,
    ) {
        let right = hes[lb].right;
        {
            let n = &mut hes[new];
            n.left = lb;
            n.right = right;
        }
        hes[right].left = new;
        hes[lb].right = new;
    }

    /// Unlinks `he` from the sequence and tombstones it. The slot is not
    /// freed here: a hash bucket may still reference it, so reclamation
    /// happens lazily in the bucket probe.
    pub fn delete(&self, hes: &mut Pool<HalfEdgeKey, HalfEdge>, he: HalfEdgeKey) {
        let (left, right) = {
            let h = &hes[he];
            (h.left, h.right)
        };
        hes[left].right = right;
        hes[right].left = left;
        hes[he].deleted = true;
    }

    /// Bucket probe: returns the cached entry, pruning (and possibly
    /// reclaiming) tombstones.
    fn get_hash(
        &mut self,
        hes: &mut Pool<HalfEdgeKey, HalfEdge>,
        b: isize,
    ) -> Option<HalfEdgeKey> {
        if b < 0 || b as usize >= self.hash.len() {
            return None;
        }
        let slot = b as usize;
        let he = self.hash[slot]?;
        if !hes[he].deleted {
            return Some(he);
        }
        // The bucket points at a tombstone. Patch it, and reclaim the slot
        // once no bucket references remain.
        self.hash[slot] = None;
        let refs = &mut hes[he].hash_refs;
        *refs -= 1;
        if *refs == 0 {
            hes.release(he);
        }
        None
    }

    /// Finds the half-edge immediately left-bounding `p`.
    ///
    /// Maps `p.x` linearly into the hash table, probes outward at increasing
    /// radius for a live entry, then walks the sequence with the `right_of`
    /// test. The landing bucket is updated to cache the result.
    pub fn locate(
        &mut self,
        hes: &mut Pool<HalfEdgeKey, HalfEdge>,
        edges: &Pool<BisectorKey, Bisector>,
        sites: &Pool<SiteKey, Site>,
        p: Point,
    ) -> HalfEdgeKey {
        let size = self.hash.len();
        let raw = (p.x - self.xmin) / self.deltax * size as f64;
        let mut bucket = if raw.is_finite() {
            #[allow(clippy::cast_possible_truncation)]
            {
                raw as isize
            }
        } else {
            0
        };
        bucket = bucket.clamp(0, size as isize - 1);

        let mut he = self.get_hash(hes, bucket);
        if he.is_none() {
            // Probe outward; the sentinels pinned at both table ends
            // guarantee termination.
            for i in 1..=size as isize {
                he = self.get_hash(hes, bucket - i);
                if he.is_some() {
                    break;
                }
                he = self.get_hash(hes, bucket + i);
                if he.is_some() {
                    break;
                }
            }
        }
        let Some(mut he) = he else {
            // Unreachable while the sentinels live; fall back to the left end.
            return self.leftend;
        };

        // Walk the ordered sequence to the correct bounding half-edge.
        if he == self.leftend
            || (he != self.rightend && right_of(edges, sites, &hes[he], p))
        {
            loop {
                he = hes[he].right;
                if he == self.rightend || !right_of(edges, sites, &hes[he], p) {
                    break;
                }
            }
            he = hes[he].left;
        } else {
            loop {
                he = hes[he].left;
                if he == self.leftend || right_of(edges, sites, &hes[he], p) {
                    break;
                }
            }
        }

        // Cache the result, maintaining bucket reference counts. Displaced
        // entries are only decremented here, never freed; reclamation still
        // happens via get_hash.
        let slot = bucket as usize;
        if slot > 0 && slot < size - 1 {
            if let Some(old) = self.hash[slot] {
                hes[old].hash_refs -= 1;
            }
            self.hash[slot] = Some(he);
            hes[he].hash_refs += 1;
        }
        he
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::bisector::{bisect, Side};

    fn setup() -> (
        Pool<SiteKey, Site>,
        Pool<BisectorKey, Bisector>,
        Pool<HalfEdgeKey, HalfEdge>,
    ) {
        (
            Pool::new("site", 8),
            Pool::new("bisector", 8),
            Pool::new("halfedge", 8),
        )
    }

    #[test]
    fn sentinels_bound_an_empty_sequence() {
        let (_, _, mut hes) = setup();
        let bl = BeachLine::new(&mut hes, 8, 0.0, 1.0).unwrap();
        assert_eq!(hes[bl.leftend].right, bl.rightend);
        assert_eq!(hes[bl.rightend].left, bl.leftend);
        // Outer links self-loop so walks cannot escape.
        assert_eq!(hes[bl.leftend].left, bl.leftend);
        assert_eq!(hes[bl.rightend].right, bl.rightend);
    }

    #[test]
    fn insert_after_splices_in_order() {
        let (mut sites, mut edges, mut hes) = setup();
        let bl = BeachLine::new(&mut hes, 8, 0.0, 2.0).unwrap();

        let s1 = sites.acquire(Site::generator(Point::new(0.0, 0.0), 0)).unwrap();
        let s2 = sites.acquire(Site::generator(Point::new(2.0, 0.0), 1)).unwrap();
        let mut next = 0;
        let e = bisect(&mut sites, &mut edges, s1, s2, &mut next).unwrap();

        let a = hes.acquire(HalfEdge::new(e, Side::Left)).unwrap();
        let b = hes.acquire(HalfEdge::new(e, Side::Right)).unwrap();
        bl.insert_after(&mut hes, bl.leftend, a);
        bl.insert_after(&mut hes, a, b);

        assert_eq!(hes[bl.leftend].right, a);
        assert_eq!(hes[a].right, b);
        assert_eq!(hes[b].right, bl.rightend);
        assert_eq!(hes[b].left, a);
    }

    #[test]
    fn delete_tombstones_without_freeing() {
        let (mut sites, mut edges, mut hes) = setup();
        let bl = BeachLine::new(&mut hes, 8, 0.0, 2.0).unwrap();

        let s1 = sites.acquire(Site::generator(Point::new(0.0, 0.0), 0)).unwrap();
        let s2 = sites.acquire(Site::generator(Point::new(2.0, 0.0), 1)).unwrap();
        let mut next = 0;
        let e = bisect(&mut sites, &mut edges, s1, s2, &mut next).unwrap();

        let a = hes.acquire(HalfEdge::new(e, Side::Left)).unwrap();
        bl.insert_after(&mut hes, bl.leftend, a);
        bl.delete(&mut hes, a);

        assert_eq!(hes[bl.leftend].right, bl.rightend);
        assert!(hes[a].deleted);
        assert!(hes.contains(a)); // tombstoned, not freed
    }

    #[test]
    fn locate_finds_bounding_halfedge_and_warms_cache() {
        let (mut sites, mut edges, mut hes) = setup();
        let mut bl = BeachLine::new(&mut hes, 8, 0.0, 4.0).unwrap();

        // Bisector of (0,0) and (4,0): the vertical line x = 2.
        let s1 = sites.acquire(Site::generator(Point::new(0.0, 0.0), 0)).unwrap();
        let s2 = sites.acquire(Site::generator(Point::new(4.0, 0.0), 1)).unwrap();
        let mut next = 0;
        let e = bisect(&mut sites, &mut edges, s1, s2, &mut next).unwrap();
        let a = hes.acquire(HalfEdge::new(e, Side::Left)).unwrap();
        bl.insert_after(&mut hes, bl.leftend, a);

        // A query left of the line is bounded by the left sentinel; a query
        // right of it is bounded by `a` itself.
        assert_eq!(
            bl.locate(&mut hes, &edges, &sites, Point::new(1.0, 1.0)),
            bl.leftend
        );
        assert_eq!(
            bl.locate(&mut hes, &edges, &sites, Point::new(2.5, 1.0)),
            a
        );
        // The second query cached `a` in an interior bucket.
        assert!(hes[a].hash_refs > 0);
    }

    #[test]
    fn tombstone_reclaimed_once_cache_reference_drops() {
        let (mut sites, mut edges, mut hes) = setup();
        let mut bl = BeachLine::new(&mut hes, 8, 0.0, 4.0).unwrap();

        let s1 = sites.acquire(Site::generator(Point::new(0.0, 0.0), 0)).unwrap();
        let s2 = sites.acquire(Site::generator(Point::new(4.0, 0.0), 1)).unwrap();
        let mut next = 0;
        let e = bisect(&mut sites, &mut edges, s1, s2, &mut next).unwrap();
        let a = hes.acquire(HalfEdge::new(e, Side::Left)).unwrap();
        bl.insert_after(&mut hes, bl.leftend, a);

        // Warm the cache with `a`, then tombstone it.
        bl.locate(&mut hes, &edges, &sites, Point::new(2.5, 1.0));
        assert_eq!(hes[a].hash_refs, 1);
        bl.delete(&mut hes, a);
        assert!(hes.contains(a));

        // The next probe through that bucket reclaims the tombstone.
        bl.locate(&mut hes, &edges, &sites, Point::new(2.5, 1.0));
        assert!(!hes.contains(a));
    }
}
