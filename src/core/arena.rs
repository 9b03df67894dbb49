//! Slab-reserving slot pools for sites, bisectors and half-edges.
//!
//! Both engines allocate their graph objects out of fixed-kind pools rather
//! than the global allocator. A [`Pool`] wraps a [`slotmap::SlotMap`] so that
//! "pointers" are versioned `(index, generation)` keys: releasing a slot and
//! later touching the stale key is caught as a programming error instead of
//! silently reading recycled memory.
//!
//! Capacity grows in slabs sized proportional to √N (N = expected total
//! sites), which keeps the amortized number of expansion events at O(√N)
//! regardless of how many objects a run allocates. An optional slot limit
//! turns exhaustion into a recoverable [`PoolError`] returned to the caller.
//!
//! Teardown is bulk only: dropping (or [`Pool::clear`]ing) the pool releases
//! every slot at once. There is no partial teardown.

use slotmap::{Key, SlotMap};
use thiserror::Error;

/// Error raised when a pool cannot provide another slot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The pool reached its configured slot limit.
    #[error("{kind} pool exhausted: limit of {limit} slots reached")]
    Exhausted {
        /// Object kind held by the pool (for diagnostics).
        kind: &'static str,
        /// The configured slot limit.
        limit: usize,
    },
}

/// A fixed-kind slot pool with slab-sized capacity growth.
#[derive(Clone, Debug)]
pub struct Pool<K: Key, V> {
    slots: SlotMap<K, V>,
    slab: usize,
    limit: Option<usize>,
    kind: &'static str,
}

impl<K: Key, V> Pool<K, V> {
    /// Creates a pool for `kind` objects that expands in slabs of `slab`
    /// slots (at least one).
    #[must_use]
    pub fn new(kind: &'static str, slab: usize) -> Self {
        Self {
            slots: SlotMap::with_key(),
            slab: slab.max(1),
            limit: None,
            kind,
        }
    }

    /// Creates a pool that refuses to grow past `limit` live slots.
    #[must_use]
    pub fn with_limit(kind: &'static str, slab: usize, limit: usize) -> Self {
        Self {
            slots: SlotMap::with_key(),
            slab: slab.max(1),
            limit: Some(limit),
            kind,
        }
    }

    /// Acquires a slot for `value`, reserving another slab first if the pool
    /// is full.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] if a slot limit is configured and reached.
    pub fn acquire(&mut self, value: V) -> Result<K, PoolError> {
        if let Some(limit) = self.limit {
            if self.slots.len() >= limit {
                return Err(PoolError::Exhausted {
                    kind: self.kind,
                    limit,
                });
            }
        }
        if self.slots.len() == self.slots.capacity() {
            self.slots.reserve(self.slab);
        }
        Ok(self.slots.insert(value))
    }

    /// Releases one slot, returning its value, or `None` if the key is stale.
    pub fn release(&mut self, key: K) -> Option<V> {
        self.slots.remove(key)
    }

    /// Borrow the value behind `key`, if the slot is still live.
    #[inline]
    #[must_use]
    pub fn get(&self, key: K) -> Option<&V> {
        self.slots.get(key)
    }

    /// Mutably borrow the value behind `key`, if the slot is still live.
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.slots.get_mut(key)
    }

    /// Whether `key` refers to a live slot.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of live slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool holds no live slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over every live `(key, value)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.slots.iter()
    }

    /// Bulk teardown: releases every slot at once.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<K: Key, V> std::ops::Index<K> for Pool<K, V> {
    type Output = V;

    /// Panics on a stale key; use-after-release is a programming error, not a
    /// runtime fault.
    #[inline]
    fn index(&self, key: K) -> &V {
        &self.slots[key]
    }
}

impl<K: Key, V> std::ops::IndexMut<K> for Pool<K, V> {
    #[inline]
    fn index_mut(&mut self, key: K) -> &mut V {
        &mut self.slots[key]
    }
}

/// Slab size used by a run expecting `n` input sites: ⌊√(n + 4)⌋.
///
/// The `+ 4` keeps tiny inputs from degenerating to one-slot slabs. The
/// beach-line and queue hash tables scale from the same root.
#[must_use]
pub fn slab_for_sites(n: usize) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let root = ((n + 4) as f64).sqrt() as usize;
    root.max(1)
}
