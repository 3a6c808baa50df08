//! Shared type definitions for the relsync crate
//!
//! Insertion-ordered hash containers used wherever output order must follow
//! declaration order (entities, fields, imports).

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

/// Type alias for IndexMap with FxHasher for better performance
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
/// Type alias for IndexSet with FxHasher for better performance
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;
