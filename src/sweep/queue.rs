//! Bucketed circle-event priority queue.
//!
//! Events are keyed by the delayed value `ystar = vertex.y + offset`, where
//! `offset` is the distance from the candidate circumcenter to the site that
//! triggers the event. The delay postpones each event until the sweep line
//! reaches the bottom of the corresponding empty circle, which is what makes
//! sweep order valid.
//!
//! `4·⌊√(N+4)⌋` buckets span `[ymin, ymax]`; within a bucket, entries are kept
//! in `(ystar, vertex.x)` ascending order by a linear insertion scan. The
//! global minimum is tracked by a cursor that only ever advances, which is
//! sound because the sweep proceeds monotonically in y.

use crate::core::arena::Pool;
use crate::geometry::point::Point;
use crate::sweep::bisector::{release_site, retain_site, HalfEdge, HalfEdgeKey, Site, SiteKey};

/// Bucketed priority queue of pending circle events.
#[derive(Debug)]
pub struct CircleQueue {
    heads: Vec<Option<HalfEdgeKey>>,
    min_bucket: usize,
    count: usize,
    ymin: f64,
    deltay: f64,
}

impl CircleQueue {
    /// Creates an empty queue with `bucket_count` buckets spanning
    /// `[ymin, ymin + deltay]`.
    #[must_use]
    pub fn new(bucket_count: usize, ymin: f64, deltay: f64) -> Self {
        Self {
            heads: vec![None; bucket_count.max(1)],
            min_bucket: 0,
            count: 0,
            ymin,
            deltay,
        }
    }

    /// Whether no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Bucket for `ystar`, pulling the minimum cursor back if needed.
    fn bucket_for(&mut self, ystar: f64) -> usize {
        let size = self.heads.len();
        let bucket = if ystar < self.ymin {
            0
        } else if ystar >= self.ymin + self.deltay {
            size - 1
        } else {
            let raw = (ystar - self.ymin) / self.deltay * size as f64;
            if raw.is_finite() {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    (raw as usize).min(size - 1)
                }
            } else {
                0
            }
        };
        if bucket < self.min_bucket {
            self.min_bucket = bucket;
        }
        bucket
    }

    /// Schedules a circle event on `he` for candidate vertex `v`, taking a
    /// reference on `v`. `offset` is the circumcenter-to-site distance that
    /// delays the event.
    pub fn insert(
        &mut self,
        hes: &mut Pool<HalfEdgeKey, HalfEdge>,
        sites: &mut Pool<SiteKey, Site>,
        he: HalfEdgeKey,
        v: SiteKey,
        offset: f64,
    ) {
        retain_site(sites, v);
        let ystar = sites[v].point.y + offset;
        let vx = sites[v].point.x;
        {
            let node = &mut hes[he];
            node.vertex = Some(v);
            node.ystar = ystar;
        }

        // Linear scan: keep the bucket ordered by (ystar, vertex.x) ascending.
        let bucket = self.bucket_for(ystar);
        let mut last: Option<HalfEdgeKey> = None;
        let mut next = self.heads[bucket];
        while let Some(n) = next {
            let node = &hes[n];
            let nx = node.vertex.map_or(f64::INFINITY, |k| sites[k].point.x);
            if ystar > node.ystar || (ystar == node.ystar && vx > nx) {
                last = Some(n);
                next = node.qnext;
            } else {
                break;
            }
        }
        match last {
            Some(l) => {
                hes[he].qnext = hes[l].qnext;
                hes[l].qnext = Some(he);
            }
            None => {
                hes[he].qnext = self.heads[bucket];
                self.heads[bucket] = Some(he);
            }
        }
        self.count += 1;
    }

    /// Cancels a pending event on `he`, if any, dropping its vertex
    /// reference. No-op when `he` carries no event.
    pub fn delete(
        &mut self,
        hes: &mut Pool<HalfEdgeKey, HalfEdge>,
        sites: &mut Pool<SiteKey, Site>,
        he: HalfEdgeKey,
    ) {
        let Some(v) = hes[he].vertex else {
            return;
        };
        let bucket = self.bucket_for(hes[he].ystar);

        if self.heads[bucket] == Some(he) {
            self.heads[bucket] = hes[he].qnext;
        } else {
            let mut cursor = self.heads[bucket];
            while let Some(c) = cursor {
                if hes[c].qnext == Some(he) {
                    hes[c].qnext = hes[he].qnext;
                    break;
                }
                cursor = hes[c].qnext;
            }
        }

        self.count -= 1;
        release_site(sites, v);
        let node = &mut hes[he];
        node.vertex = None;
        node.qnext = None;
    }

    /// Coordinates of the minimum pending event as `(vertex.x, ystar)`,
    /// advancing the forward-only cursor. `None` when empty.
    pub fn peek_min(
        &mut self,
        hes: &Pool<HalfEdgeKey, HalfEdge>,
        sites: &Pool<SiteKey, Site>,
    ) -> Option<Point> {
        let head = self.advance_cursor(hes)?;
        let node = &hes[head];
        let v = node.vertex?;
        Some(Point::new(sites[v].point.x, node.ystar))
    }

    /// Pops the minimum event, returning the triggering half-edge and its
    /// candidate vertex. The vertex reference transfers to the caller.
    pub fn pop_event(
        &mut self,
        hes: &mut Pool<HalfEdgeKey, HalfEdge>,
    ) -> Option<(HalfEdgeKey, SiteKey)> {
        let head = self.advance_cursor(hes)?;
        self.heads[self.min_bucket] = hes[head].qnext;
        self.count -= 1;
        let node = &mut hes[head];
        node.qnext = None;
        let v = node.vertex?;
        Some((head, v))
    }

    fn advance_cursor(&mut self, _hes: &Pool<HalfEdgeKey, HalfEdge>) -> Option<HalfEdgeKey> {
        if self.count == 0 {
            return None;
        }
        while self.min_bucket < self.heads.len() {
            if let Some(head) = self.heads[self.min_bucket] {
                return Some(head);
            }
            self.min_bucket += 1;
        }
        None
    }
}
