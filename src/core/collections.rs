//! Collection aliases used across the crate.
//!
//! - [`FastHashMap`] / [`FastHashSet`]: `rustc-hash` hashers. Keys are vertex
//!   index tuples and slot-map keys, never attacker-controlled strings.
//! - [`SmallBuffer`]: stack-first buffers for per-tetrahedron data.
//! - [`StorageMap`]: the slot map holding tetrahedra, `DenseSlotMap` with the
//!   default `dense-slotmap` feature and `SlotMap` otherwise.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Slot map used for tetrahedron storage.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Slot map used for tetrahedron storage.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Hash map with the `FxHash` hasher.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Hash set with the `FxHash` hasher.
pub type FastHashSet<T> = FxHashSet<T>;

pub use std::collections::hash_map::Entry;

/// Stack-allocated buffer for up to `N` elements, spilling to the heap.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Creates a [`FastHashMap`] with room for `capacity` entries.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

/// Creates a [`FastHashSet`] with room for `capacity` entries.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

// =============================================================================
// SEMANTIC SIZE CONSTANTS
// =============================================================================

/// Typical number of tetrahedra removed by one insertion. Cavities in random
/// point sets hold a handful of tetrahedra; larger ones spill to the heap.
pub const CAVITY_BUFFER_SIZE: usize = 32;

/// Typical number of boundary faces of one cavity.
pub const BOUNDARY_BUFFER_SIZE: usize = 64;
