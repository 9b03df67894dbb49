//! Directed-edge mesh over a fixed lattice.
//!
//! The grid engine stores its planar subdivision as pairs of directed edges:
//! each [`DirEdge`] knows its origin, its oppositely-directed `twin` and the
//! next edge counterclockwise around its origin (`onext`). Those two links are
//! enough to derive every traversal the triangulator needs (see
//! [`topology`](crate::quadedge::topology)).
//!
//! [`GridMesh`] anchors the edge arena to a width×height lattice: each cell
//! remembers whether its point is live and holds one outgoing edge key as the
//! entry into that point's ring. Cells of removed points stay addressable, so
//! removal never reshapes the lattice bookkeeping.

use crate::core::arena::{Pool, PoolError};
use crate::core::collections::FastHashSet;
use crate::geometry::point::GridPoint;
use crate::geometry::predicates::ccw;
use crate::quadedge::topology::lnext;
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    /// Versioned key into a mesh's directed-edge pool.
    pub struct EdgeKey;
}

/// One directed edge of the subdivision.
///
/// Edges always exist in twin pairs; `twin(twin(e)) == e` is a structural
/// invariant. `onext` chains the edges sharing an origin into a finite
/// counterclockwise ring.
#[derive(Clone, Copy, Debug)]
pub struct DirEdge {
    /// Origin lattice point.
    pub orig: GridPoint,
    /// The oppositely-directed companion edge.
    pub twin: EdgeKey,
    /// Next edge counterclockwise around `orig`.
    pub onext: EdgeKey,
}

/// Errors from the grid engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// A lattice dimension is zero.
    #[error("grid dimensions must be nonzero, got {width}x{height}")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A lattice dimension exceeds [`MAX_GRID_DIM`].
    #[error("grid dimensions {width}x{height} exceed the maximum of {max}", max = MAX_GRID_DIM)]
    OversizedGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A point lies outside the lattice.
    #[error("point {point} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending point.
        point: GridPoint,
        /// Lattice width.
        width: u32,
        /// Lattice height.
        height: u32,
    },
    /// A structural invariant does not hold (reported by [`GridMesh::validate`]).
    #[error("mesh invariant violated: {detail}")]
    Corrupt {
        /// Which invariant failed, and where.
        detail: String,
    },
    /// The edge arena reached its configured slot limit.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Storage seam shared by [`GridMesh`] and the private build fragments: an
/// edge arena plus a per-point entry edge.
pub trait Mesh {
    /// The directed-edge arena.
    fn edges(&self) -> &Pool<EdgeKey, DirEdge>;
    /// Mutable access to the directed-edge arena.
    fn edges_mut(&mut self) -> &mut Pool<EdgeKey, DirEdge>;
    /// The stored outgoing edge of `p`, if any.
    fn edge_out(&self, p: GridPoint) -> Option<EdgeKey>;
    /// Replaces the stored outgoing edge of `p`.
    fn set_edge_out(&mut self, p: GridPoint, e: Option<EdgeKey>);
}

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    out: Option<EdgeKey>,
    live: bool,
}

/// Largest accepted lattice dimension. Every coordinate then stays below
/// `1 << 30`, the range the exact predicates in
/// [`predicates`](crate::geometry::predicates) cover without overflow.
pub const MAX_GRID_DIM: u32 = 1 << 30;

/// A quad-edge triangulation anchored to a width×height lattice.
#[derive(Clone, Debug)]
pub struct GridMesh {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    edges: Pool<EdgeKey, DirEdge>,
    live: usize,
}

impl GridMesh {
    /// Creates an empty mesh over a `width` × `height` lattice.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] if either dimension is zero,
    /// [`GridError::OversizedGrid`] if either exceeds [`MAX_GRID_DIM`].
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        if width > MAX_GRID_DIM || height > MAX_GRID_DIM {
            return Err(GridError::OversizedGrid { width, height });
        }
        let cells = vec![Cell::default(); width as usize * height as usize];
        Ok(Self {
            width,
            height,
            cells,
            edges: Pool::new("edge", 64),
            live: 0,
        })
    }

    /// Lattice width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Lattice height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of live (inserted and not removed) points.
    #[must_use]
    pub fn live_points(&self) -> usize {
        self.live
    }

    /// Number of directed edges currently in the mesh.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `p` is live in the mesh.
    #[must_use]
    pub fn is_live(&self, p: GridPoint) -> bool {
        self.cell(p).is_some_and(|c| c.live)
    }

    pub(crate) fn cell_index(&self, p: GridPoint) -> Option<usize> {
        if p.col < self.width && p.row < self.height {
            Some(p.row as usize * self.width as usize + p.col as usize)
        } else {
            None
        }
    }

    fn cell(&self, p: GridPoint) -> Option<&Cell> {
        self.cell_index(p).map(|i| &self.cells[i])
    }

    pub(crate) fn bounds_check(&self, p: GridPoint) -> Result<usize, GridError> {
        self.cell_index(p).ok_or(GridError::OutOfBounds {
            point: p,
            width: self.width,
            height: self.height,
        })
    }

    pub(crate) fn mark_live(&mut self, p: GridPoint, live: bool) {
        if let Some(i) = self.cell_index(p) {
            let was = self.cells[i].live;
            self.cells[i].live = live;
            match (was, live) {
                (false, true) => self.live += 1,
                (true, false) => self.live -= 1,
                _ => {}
            }
        }
    }

    /// Drops every edge and live mark, keeping the lattice dimensions.
    pub fn reset(&mut self) {
        self.edges.clear();
        for c in &mut self.cells {
            *c = Cell::default();
        }
        self.live = 0;
    }

    /// Extracts every triangle of the current subdivision, each emitted once
    /// in counterclockwise order rotated so its smallest vertex leads, with
    /// the list sorted. The output therefore does not depend on arena slot
    /// history, e.g. after rebuilds on a reused mesh. Fewer than three live
    /// points yield an empty list.
    #[must_use]
    pub fn triangles(&self) -> Vec<[GridPoint; 3]> {
        let mut out = Vec::new();
        let mut visited: FastHashSet<EdgeKey> = FastHashSet::default();
        for (start, _) in self.edges.iter() {
            if visited.contains(&start) {
                continue;
            }
            // Walk the full left-face cycle so the outer face is only ever
            // traversed once.
            let mut cycle: [GridPoint; 3] = [GridPoint::new(0, 0); 3];
            let mut len = 0usize;
            let mut e = start;
            loop {
                visited.insert(e);
                if len < 3 {
                    cycle[len] = self.edges[e].orig;
                }
                len += 1;
                e = lnext(self, e);
                if e == start {
                    break;
                }
            }
            if len == 3 && ccw(cycle[0], cycle[1], cycle[2]) {
                // Smallest vertex first, keeping the counterclockwise order.
                let lead = if cycle[1] < cycle[0] && cycle[1] < cycle[2] {
                    1
                } else if cycle[2] < cycle[0] && cycle[2] < cycle[1] {
                    2
                } else {
                    0
                };
                cycle.rotate_left(lead);
                out.push(cycle);
            }
        }
        out.sort_unstable();
        out
    }

    /// Checks the structural invariants: twin involution, origin-consistent
    /// finite onext rings, and cell bookkeeping that matches the edge arena.
    ///
    /// # Errors
    ///
    /// [`GridError::Corrupt`] naming the first violated invariant.
    pub fn validate(&self) -> Result<(), GridError> {
        let corrupt = |detail: String| Err(GridError::Corrupt { detail });

        for (k, de) in self.edges.iter() {
            let Some(twin) = self.edges.get(de.twin) else {
                return corrupt(format!("edge at {} has a dangling twin", de.orig));
            };
            if twin.twin != k {
                return corrupt(format!("twin involution broken at {}", de.orig));
            }
            if de.twin == k || twin.orig == de.orig {
                return corrupt(format!("degenerate self-edge at {}", de.orig));
            }

            let Some(next) = self.edges.get(de.onext) else {
                return corrupt(format!("edge at {} has a dangling onext", de.orig));
            };
            if next.orig != de.orig {
                return corrupt(format!("onext leaves the origin ring at {}", de.orig));
            }
            // Ring finiteness: the walk must come back within the arena size.
            let mut f = de.onext;
            let mut steps = 0usize;
            while f != k {
                f = self.edges[f].onext;
                steps += 1;
                if steps > self.edges.len() {
                    return corrupt(format!("unterminated onext ring at {}", de.orig));
                }
            }
        }

        let mut live_seen = 0usize;
        for (i, c) in self.cells.iter().enumerate() {
            if c.live {
                live_seen += 1;
            }
            if let Some(e) = c.out {
                let Some(de) = self.edges.get(e) else {
                    return corrupt(format!("cell {i} holds a stale edge key"));
                };
                if self.cell_index(de.orig) != Some(i) {
                    return corrupt(format!("cell {i} points at an edge rooted elsewhere"));
                }
                if !c.live {
                    return corrupt(format!("dead cell {i} still owns edges"));
                }
            }
        }
        if live_seen != self.live {
            return corrupt(format!(
                "live-point count {} does not match cells ({live_seen})",
                self.live
            ));
        }
        Ok(())
    }
}

impl Mesh for GridMesh {
    fn edges(&self) -> &Pool<EdgeKey, DirEdge> {
        &self.edges
    }

    fn edges_mut(&mut self) -> &mut Pool<EdgeKey, DirEdge> {
        &mut self.edges
    }

    fn edge_out(&self, p: GridPoint) -> Option<EdgeKey> {
        self.cell(p).and_then(|c| c.out)
    }

    fn set_edge_out(&mut self, p: GridPoint, e: Option<EdgeKey>) {
        if let Some(i) = self.cell_index(p) {
            self.cells[i].out = e;
        }
    }
}
