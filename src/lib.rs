//! # terratri
//!
//! Planar Delaunay triangulation (and, dually, Voronoi diagram) kernel for
//! terrain/point-cloud processing pipelines.
//!
//! The crate provides two coexisting engines over the same problem, namely
//! maintaining a consistent planar subdivision under a fixed point set, with
//! support for incremental point removal:
//!
//! - [`sweep`]: a sequential Fortune sweep-line constructor with a
//!   hash-assisted beach-line status structure, a bucketed circle-event queue
//!   and slab-reserving arena allocation. It streams Delaunay triangle triples
//!   (indices into the caller's input array) as circle events resolve.
//! - [`quadedge`]: a grid-indexed, quad-edge divide-and-conquer triangulator
//!   supporting fork-join threaded construction and local incremental
//!   retriangulation after point deletion. It maintains an addressable mesh;
//!   triangles are extracted on demand by a face walk.
//!
//! # Basic usage
//!
//! Sweep-line engine (input must be sorted by `(y, x)` ascending):
//!
//! ```rust
//! use terratri::prelude::*;
//!
//! let sites = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(0.0, 1.0),
//!     Point::new(1.0, 1.0),
//! ];
//!
//! let triangles = terratri::sweep::triangulate(&sites).unwrap();
//! assert_eq!(triangles.len(), 2); // unit square splits along one diagonal
//! ```
//!
//! Grid engine:
//!
//! ```rust
//! use terratri::prelude::*;
//!
//! let mut mesh = GridMesh::new(4, 4).unwrap();
//! let points = vec![
//!     GridPoint::new(0, 0),
//!     GridPoint::new(3, 0),
//!     GridPoint::new(0, 3),
//!     GridPoint::new(3, 3),
//!     GridPoint::new(1, 2),
//! ];
//! mesh.triangulate(&points).unwrap();
//!
//! let before = mesh.triangles().len();
//! mesh.remove_and_retriangulate(GridPoint::new(1, 2)).unwrap();
//! assert!(mesh.triangles().len() < before);
//! ```
//!
//! # Numeric policy
//!
//! The sweep engine works in `f64` with a fixed degeneracy policy: a
//! `1e-10` epsilon classifies bisector pairs as parallel (silently skipped,
//! never an error), and the strict/non-strict comparisons in the `right_of`
//! test are part of the output contract on degenerate inputs. The grid engine
//! evaluates orientation and in-circle predicates in exact integer arithmetic
//! on lattice coordinates, with strict containment driving edge flips so that
//! cocircular configurations (e.g. the unit square) resolve deterministically.
//!
//! # Error handling
//!
//! Geometric degeneracies (parallel bisectors, colinear sites) are normal
//! outcomes, not faults: they produce "no event" or zero triangles. Removing
//! an absent point is a no-op. Arena exhaustion against a configured slot
//! limit is surfaced as a recoverable [`core::arena::PoolError`] rather than
//! aborting the process.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core {
    //! Arena allocation and collection aliases shared by both engines.
    pub mod arena;
    pub mod collections;

    pub use arena::*;
    pub use collections::*;
}

pub mod geometry {
    //! Points and the exact lattice predicates used by the grid engine.
    pub mod point;
    pub mod predicates;

    pub use point::*;
    pub use predicates::*;
}

pub mod sweep {
    //! Fortune sweep-line Voronoi/Delaunay-dual constructor.
    pub mod beachline;
    pub mod bisector;
    pub mod engine;
    pub mod queue;

    pub use engine::{triangulate, SweepContext, SweepError, Triangle};
}

pub mod quadedge {
    //! Grid-indexed quad-edge mesh and divide-and-conquer triangulator.
    pub mod builder;
    pub mod mesh;
    pub mod removal;
    pub mod topology;

    pub use mesh::{DirEdge, EdgeKey, GridError, GridMesh, MAX_GRID_DIM};
}

/// Convenient re-exports of the crate's primary types.
pub mod prelude {
    pub use crate::core::arena::{Pool, PoolError};
    pub use crate::geometry::point::{GridPoint, Point};
    pub use crate::quadedge::mesh::{GridError, GridMesh};
    pub use crate::sweep::engine::{triangulate, SweepContext, SweepError, Triangle};
}
