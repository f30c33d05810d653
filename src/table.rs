//! ScatterTable: open addressing with a shared, shuffled probe permutation.

use crate::bucket::Bucket;
use core::fmt;
use core::hash::BuildHasher;
use core::mem;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::hash_map::RandomState;

/// Capacity substituted when a table is requested with zero buckets.
const DEFAULT_CAPACITY: usize = 8;

/// Outcome of walking a key's probe chain.
#[derive(Copy, Clone, Debug)]
enum Probe {
    /// The key is present in the occupied bucket at this index.
    Live(usize),
    /// The key is absent; an insert for it should use this index.
    Vacant(usize),
}

/// A string-keyed table mapping to `u64` values, resolving collisions by
/// open addressing over a randomized probe sequence.
///
/// Instead of a per-key deterministic step (linear or quadratic), every
/// probe chain follows one table-wide shuffled permutation of the nonzero
/// offsets, which spreads collision chains across the storage and avoids
/// primary/secondary clustering. The permutation is reshuffled whenever
/// capacity changes.
///
/// Mutation requires `&mut self`; share a table across threads only
/// behind external mutual exclusion.
pub struct ScatterTable<S = RandomState> {
    buckets: Vec<Bucket>,
    /// Shuffled permutation of `1..capacity`, shared by every probe
    /// chain. Regenerated on every capacity change.
    offsets: Vec<usize>,
    len: usize,
    hasher: S,
    rng: StdRng,
}

#[derive(Debug)]
pub enum InsertError {
    DuplicateKey,
}

impl ScatterTable {
    /// A table with the default capacity of 8 buckets.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A table with `capacity` buckets; zero is normalized to the
    /// default of 8.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }
}

impl Default for ScatterTable {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ScatterTable<S> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets. Grows by doubling; never shrinks.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Live load factor: `len / capacity`, computed on demand. At most
    /// 0.5 after any insert.
    pub fn alpha(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// All live keys, in bucket-scan order. The order tracks hash
    /// placement, the shuffled offsets, and resize history, so it is
    /// not meaningful and not stable across mutations.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len);
        keys.extend(self.iter().map(|(key, _)| key.to_owned()));
        keys
    }

    /// Iterate over live `(key, value)` pairs in bucket-scan order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.buckets.iter(),
        }
    }

    /// Iterate over live entries with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            inner: self.buckets.iter_mut(),
        }
    }
}

impl<S> ScatterTable<S>
where
    S: BuildHasher,
{
    /// A table with a caller-supplied hash state. Nothing is assumed of
    /// the hash beyond per-table determinism: repeated hashes of the
    /// same key must agree while the table exists.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        let mut table = Self {
            buckets: blank_storage(capacity),
            offsets: Vec::new(),
            len: 0,
            hasher,
            rng: StdRng::from_entropy(),
        };
        table.regenerate_offsets();
        table
    }

    /// Insert a key/value pair. A key that is already present is
    /// rejected and the table contents are unchanged. The growth check
    /// runs before the duplicate is detected, so a rejected insert may
    /// still have grown the table.
    pub fn insert(&mut self, key: String, value: u64) -> Result<(), InsertError> {
        if self.len + 1 > self.buckets.len() / 2 {
            self.grow(self.buckets.len() * 2);
        }
        match self.probe(&key) {
            Probe::Live(_) => Err(InsertError::DuplicateKey),
            Probe::Vacant(idx) => {
                // Below half load there is always a blank or tombstoned
                // slot on the chain, so the fallback never hands out a
                // live bucket here.
                debug_assert!(self.buckets[idx].is_empty());
                self.buckets[idx].load(key, value);
                self.len += 1;
                Ok(())
            }
        }
    }

    /// Remove a key, returning the value it held, or `None` when the key
    /// is absent. The bucket is tombstoned rather than blanked so probe
    /// chains running through it stay intact; tombstones are reclaimed
    /// only by the resize rebuild.
    pub fn remove(&mut self, key: &str) -> Option<u64> {
        match self.probe(key) {
            Probe::Live(idx) => {
                let (_key, value) = self.buckets[idx].mark_deleted()?;
                self.len -= 1;
                Some(value)
            }
            Probe::Vacant(_) => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.probe(key), Probe::Live(_))
    }

    /// The value stored for `key`, or `None` when absent. Absence is an
    /// explicit result; no value is reserved as a sentinel.
    pub fn get(&self, key: &str) -> Option<u64> {
        match self.probe(key) {
            Probe::Live(idx) => self.buckets[idx].entry().map(|(_, value)| value),
            Probe::Vacant(_) => None,
        }
    }

    /// Map-style index access: a missing key is first materialized with
    /// value 0, then a mutable reference to its stored value is
    /// returned. Present keys are not re-inserted.
    ///
    /// The returned borrow pins the table, so no structural mutation can
    /// invalidate it while it is held.
    pub fn get_or_insert_default(&mut self, key: &str) -> &mut u64 {
        let idx = match self.probe(key) {
            Probe::Live(idx) => idx,
            Probe::Vacant(mut idx) => {
                // Same growth rule as insert. The rebuild moves every
                // chain, so the insertion slot must be probed again.
                if self.len + 1 > self.buckets.len() / 2 {
                    self.grow(self.buckets.len() * 2);
                    idx = match self.probe(key) {
                        Probe::Vacant(idx) | Probe::Live(idx) => idx,
                    };
                }
                self.buckets[idx].load(key.to_owned(), 0);
                self.len += 1;
                idx
            }
        };
        self.buckets[idx]
            .value_mut()
            .expect("probe resolved a live or freshly loaded bucket")
    }

    /// Walk the probe chain for `key`: the home bucket first, then home
    /// plus each shuffled offset, mod capacity.
    ///
    /// Three-way test per bucket: an occupied bucket matching `key` ends
    /// the walk as `Live`; a tombstone is remembered (first one only)
    /// and skipped; a blank bucket ends the walk, since no live key can
    /// sit past a blank bucket on its own chain. Inserts prefer the
    /// first tombstone over the terminating blank so deleted slots are
    /// reused.
    fn probe(&self, key: &str) -> Probe {
        let capacity = self.buckets.len();
        let home = self.home_index(key);
        let mut first_tombstone = None;

        let chain = core::iter::once(home).chain(
            self.offsets
                .iter()
                .map(|offset| (home + offset) % capacity),
        );
        for idx in chain {
            let bucket = &self.buckets[idx];
            if let Some((resident, _)) = bucket.entry() {
                if resident == key {
                    return Probe::Live(idx);
                }
            } else if bucket.is_deleted() {
                first_tombstone.get_or_insert(idx);
            } else {
                return Probe::Vacant(first_tombstone.unwrap_or(idx));
            }
        }

        // The whole chain is occupied or tombstoned. Unreachable while
        // the 0.5 load bound holds; still, report a valid slot rather
        // than fail.
        Probe::Vacant(first_tombstone.unwrap_or(home))
    }

    fn home_index(&self, key: &str) -> usize {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    /// Refill `offsets` with `1..capacity` and shuffle. A capacity of 1
    /// leaves the permutation empty, so probing visits only the home
    /// bucket.
    fn regenerate_offsets(&mut self) {
        self.offsets.clear();
        self.offsets.extend(1..self.buckets.len());
        self.offsets.shuffle(&mut self.rng);
    }

    /// Capacity-doubling rebuild: fresh blank storage, a reshuffled
    /// offset permutation, and every live entry re-inserted in scan
    /// order through the normal insert path. Tombstones are dropped
    /// here and nowhere else.
    fn grow(&mut self, new_capacity: usize) {
        #[cfg(feature = "logging")]
        log::debug!(
            "scatter-table rebuild: capacity {} -> {}, len {}",
            self.buckets.len(),
            new_capacity,
            self.len
        );

        let old = mem::replace(&mut self.buckets, blank_storage(new_capacity));
        self.len = 0;
        self.regenerate_offsets();

        for bucket in old {
            if let Some((key, value)) = bucket.into_entry() {
                let reinserted = self.insert(key, value).is_ok();
                debug_assert!(reinserted, "live keys are distinct across a rebuild");
            }
        }
    }
}

fn blank_storage(capacity: usize) -> Vec<Bucket> {
    core::iter::repeat_with(Bucket::default)
        .take(capacity)
        .collect()
}

impl<S> fmt::Display for ScatterTable<S> {
    /// Diagnostic rendering: one `Bucket <index>: <key, value>` line per
    /// occupied bucket, in ascending index order. Blank and tombstoned
    /// buckets are omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, bucket) in self.buckets.iter().enumerate() {
            if bucket.is_occupied() {
                writeln!(f, "Bucket {idx}: {bucket}")?;
            }
        }
        Ok(())
    }
}

impl<S> fmt::Debug for ScatterTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScatterTable")
            .field("len", &self.len)
            .field("capacity", &self.buckets.len())
            .field("alpha", &self.alpha())
            .finish()
    }
}

/// Iterator over live entries in bucket-scan order.
pub struct Iter<'a> {
    inner: core::slice::Iter<'a, Bucket>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(Bucket::entry)
    }
}

/// Iterator over live entries with mutable values, in bucket-scan order.
pub struct IterMut<'a> {
    inner: core::slice::IterMut<'a, Bucket>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (&'a str, &'a mut u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(Bucket::entry_mut)
    }
}
