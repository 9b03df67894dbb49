//! Collection aliases tuned for the triangulation kernels.
//!
//! Internal maps and sets key on arena keys or lattice coordinates, which are
//! trusted, non-adversarial data, so they use `FxHasher` rather than the
//! DoS-resistant default. Small per-vertex buffers (edge rings, hole
//! boundaries) stay on the stack via `smallvec`.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Fast `HashMap` for internal, trusted keys.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast `HashSet` for internal, trusted keys.
pub type FastHashSet<T> = FxHashSet<T>;

/// Stack-first buffer; spills to the heap past `N` elements.
///
/// `N = 8` covers the typical vertex degree in a planar triangulation
/// (average < 6), so ring and hole-boundary collection rarely allocates.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;
