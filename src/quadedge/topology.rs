//! Ring navigation and the structural edit operations on a [`Mesh`].
//!
//! Only two links are stored per directed edge (`twin` and `onext`); every
//! other traversal is derived:
//!
//! - `lnext(e)`: next edge counterclockwise around the left face of `e`,
//!   computed as `oprev(sym(e))`.
//! - `rprev(e)`: previous edge around the right face, `onext(sym(e))`. A
//!   counterclockwise hull edge carries the outer face on its right, so
//!   `rprev` advances such an edge counterclockwise along the hull.
//!
//! `oprev` is a bounded walk around the origin ring rather than a stored
//! link; ring degrees in a planar triangulation average below six, so the
//! walk is cheap.
//!
//! All edits preserve the twin involution and keep per-point entry edges
//! valid, so [`GridMesh::validate`](crate::quadedge::mesh::GridMesh::validate)
//! holds across any sequence of them.

use crate::core::arena::PoolError;
use crate::geometry::point::GridPoint;
use crate::quadedge::mesh::{DirEdge, EdgeKey, Mesh};
use slotmap::Key;

/// The oppositely-directed companion of `e`.
#[inline]
pub fn sym<M: Mesh>(m: &M, e: EdgeKey) -> EdgeKey {
    m.edges()[e].twin
}

/// Origin of `e`.
#[inline]
pub fn orig<M: Mesh>(m: &M, e: EdgeKey) -> GridPoint {
    m.edges()[e].orig
}

/// Destination of `e` (origin of its twin).
#[inline]
pub fn dest<M: Mesh>(m: &M, e: EdgeKey) -> GridPoint {
    let t = m.edges()[e].twin;
    m.edges()[t].orig
}

/// Next edge counterclockwise around the origin of `e`.
#[inline]
pub fn onext<M: Mesh>(m: &M, e: EdgeKey) -> EdgeKey {
    m.edges()[e].onext
}

/// Previous edge around the origin of `e` (one full ring walk).
pub fn oprev<M: Mesh>(m: &M, e: EdgeKey) -> EdgeKey {
    let mut f = e;
    loop {
        let n = m.edges()[f].onext;
        if n == e {
            return f;
        }
        f = n;
    }
}

/// Next edge counterclockwise around the left face of `e`.
#[inline]
pub fn lnext<M: Mesh>(m: &M, e: EdgeKey) -> EdgeKey {
    let s = sym(m, e);
    oprev(m, s)
}

/// Previous edge around the right face of `e`.
///
/// Counterclockwise hull edges have the outer face on their right, so this
/// advances such an edge counterclockwise along the hull.
#[inline]
pub fn rprev<M: Mesh>(m: &M, e: EdgeKey) -> EdgeKey {
    let s = sym(m, e);
    onext(m, s)
}

/// Creates an isolated twin pair from `from` to `to`, returning the forward
/// edge. Both edges start self-looped; callers position them with [`weld`].
/// Points without an entry edge adopt the new edge as theirs.
///
/// # Errors
///
/// Propagates edge-arena exhaustion.
pub fn add_edge<M: Mesh>(m: &mut M, from: GridPoint, to: GridPoint) -> Result<EdgeKey, PoolError> {
    let e = m.edges_mut().acquire(DirEdge {
        orig: from,
        twin: EdgeKey::null(),
        onext: EdgeKey::null(),
    })?;
    let t = m.edges_mut().acquire(DirEdge {
        orig: to,
        twin: e,
        onext: EdgeKey::null(),
    })?;
    {
        let de = &mut m.edges_mut()[e];
        de.twin = t;
        de.onext = e;
    }
    m.edges_mut()[t].onext = t;

    if m.edge_out(from).is_none() {
        m.set_edge_out(from, Some(e));
    }
    if m.edge_out(to).is_none() {
        m.set_edge_out(to, Some(t));
    }
    Ok(e)
}

/// Splices two same-origin edges by swapping their ring successors: if `a`
/// and `b` are in different rings the rings fuse, if they share a ring it
/// splits. Self-inverse.
pub fn weld<M: Mesh>(m: &mut M, a: EdgeKey, b: EdgeKey) {
    debug_assert_eq!(m.edges()[a].orig, m.edges()[b].orig);
    let an = m.edges()[a].onext;
    let bn = m.edges()[b].onext;
    m.edges_mut()[a].onext = bn;
    m.edges_mut()[b].onext = an;
}

/// Connects `dest(a)` to `orig(b)` across the face both edges border,
/// positioning the new pair so that its left face is that shared face.
/// Returns the forward edge.
///
/// # Errors
///
/// Propagates edge-arena exhaustion.
pub fn bridge<M: Mesh>(m: &mut M, a: EdgeKey, b: EdgeKey) -> Result<EdgeKey, PoolError> {
    let from = dest(m, a);
    let to = orig(m, b);
    let e = add_edge(m, from, to)?;
    let la = lnext(m, a);
    weld(m, e, la);
    let se = sym(m, e);
    weld(m, se, b);
    Ok(e)
}

/// Excises the twin pair of `e` from both endpoint rings and releases both
/// slots, repointing entry edges that referenced the pair.
pub fn remove_edge<M: Mesh>(m: &mut M, e: EdgeKey) {
    let t = sym(m, e);
    for k in [e, t] {
        let o = orig(m, k);
        if m.edge_out(o) == Some(k) {
            let n = onext(m, k);
            m.set_edge_out(o, if n == k { None } else { Some(n) });
        }
    }
    for k in [e, t] {
        let p = oprev(m, k);
        if p != k {
            weld(m, k, p);
        }
    }
    m.edges_mut().release(e);
    m.edges_mut().release(t);
}
