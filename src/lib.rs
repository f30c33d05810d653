//! scatter-table: a single-threaded, string-keyed hash table using open
//! addressing with randomized (shuffled-permutation) probing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: resolve collisions without the clustering pathologies of
//!   linear/quadratic probing by walking one table-wide shuffled
//!   permutation of probe offsets instead of a per-key step sequence.
//! - Layers:
//!   - Bucket: tri-state storage cell (blank / occupied / tombstoned)
//!     exposing only state transitions and occupancy queries.
//!   - ScatterTable<S>: owns the bucket storage, the shuffled offset
//!     permutation, and all control logic (hashing, probing,
//!     insertion, removal, and the capacity-doubling rebuild).
//!
//! Probing
//! - Every operation funnels through one probe routine: inspect the
//!   home bucket (`hash(key) % capacity`), then `home + offset` for
//!   each offset of the stored permutation of `1..capacity`.
//! - A matching occupied bucket resolves the key; tombstones are
//!   skipped (remembering the first, so inserts reuse deleted slots);
//!   a blank bucket ends the chain, because no live key is ever placed
//!   past a blank bucket on its own chain. That invariant holds after
//!   every insert, removal, and rebuild.
//! - The permutation is shared by all keys and reshuffled from OS
//!   entropy whenever capacity changes. Uniform coverage is all that is
//!   asked of it; there is no cryptographic requirement.
//!
//! Growth and tombstones
//! - An insert that would push the load factor past 0.5 first doubles
//!   capacity and re-inserts every live entry into fresh storage. The
//!   table never shrinks, and a rebuild is the only point where
//!   tombstones are reclaimed; delete-heavy workloads at constant size
//!   accumulate tombstones by design.
//!
//! Constraints
//! - Single-threaded: mutation goes through `&mut self`, so shared use
//!   across threads needs external mutual exclusion.
//! - Keys are `String` (queried as `&str`), values are `u64`; this is
//!   deliberately not a generic container.
//! - Duplicate inserts fail with [`InsertError::DuplicateKey`]; absent
//!   lookups return `None`. No library path panics.
//!
//! Index access
//! - [`ScatterTable::get_or_insert_default`] mirrors map-style
//!   `table[key]` access: a missing key is materialized with value 0
//!   and a mutable reference to the stored value is returned. The
//!   reference borrows the table, so the borrow checker rules out
//!   structural mutation while it is held; the reference cannot
//!   outlive its storage across a rebuild.
//!
//! Notes and non-goals
//! - Iteration order is bucket-scan order: it depends on hashing, the
//!   shuffled offsets, and resize history, and is not stable across
//!   mutations.
//! - No persistence, no weak form of concurrency, no shrink-on-delete,
//!   no tombstone compaction outside the rebuild.

mod bucket;
mod table;
mod table_proptest;

// Public surface
pub use table::{InsertError, Iter, IterMut, ScatterTable};
