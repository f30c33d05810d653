#![cfg(test)]

// Property tests for ScatterTable kept inside the crate so they can also
// check internal invariants (offset permutation, tombstone placement).

use crate::table::{InsertError, ScatterTable};
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, u64),
    Remove(usize),
    Get(usize),
    Contains(String),
    Assign(usize, u64),
    DefaultAccess(usize),
    Keys,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let pool: Vec<String> = {
            let set: BTreeSet<String> = pool.into_iter().collect();
            set.into_iter().collect()
        };
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<u64>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            (idx.clone(), any::<u64>()).prop_map(|(i, v)| OpI::Assign(i, v)),
            idx.clone().prop_map(OpI::DefaultAccess),
            Just(OpI::Keys),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_state_machine<S: BuildHasher>(
    mut sut: ScatterTable<S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, u64> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                match sut.insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.insert(k, v);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        // Rejected insert must leave the stored value alone.
                        prop_assert_eq!(sut.get(&k), model.get(&k).copied());
                    }
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let removed = sut.remove(k);
                prop_assert_eq!(removed, model.remove(k));
                prop_assert!(!sut.contains(k));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k).copied());
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
            }
            OpI::Assign(i, v) => {
                let k = &pool[i];
                *sut.get_or_insert_default(k) = v;
                model.insert(k.clone(), v);
            }
            OpI::DefaultAccess(i) => {
                let k = &pool[i];
                let expected = *model.entry(k.clone()).or_insert(0);
                let got = *sut.get_or_insert_default(k);
                prop_assert_eq!(got, expected, "missing key materializes as 0 exactly once");
            }
            OpI::Keys => {
                let s_keys: BTreeSet<String> = sut.keys().into_iter().collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(&s_keys, &m_keys);
                prop_assert_eq!(sut.keys().len(), model.len(), "keys() has no duplicates");
            }
        }

        // Post-conditions after each op
        // 1) Size parity with the model.
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        // 2) Load factor bound: len never exceeds half the capacity.
        prop_assert!(sut.len() * 2 <= sut.capacity());
        prop_assert!(sut.alpha() <= 0.5);
        // 3) No orphans: every model key resolves with its exact value.
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(*v));
        }
        // 4) Iteration agrees with the model entry-for-entry.
        let seen: HashMap<String, u64> = sut.iter().map(|(k, v)| (k.to_owned(), v)).collect();
        prop_assert_eq!(&seen, &model);
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Duplicate inserts are rejected without touching the stored value.
// - remove/get/contains parity with the model after each op.
// - get_or_insert_default materializes a missing key as 0 exactly once.
// - Load factor stays at or below 0.5 after every operation.
// - Every live key remains reachable along its probe chain (no orphans).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(ScatterTable::new(), pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key homes to the same
// bucket, so correctness rests entirely on the offset permutation walk,
// tombstone reuse, and the blank-bucket short-circuit.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ScatterTable::with_capacity_and_hasher(8, ConstBuildHasher);
        run_state_machine(sut, pool, ops)?;
    }
}

// Property: growth is tried from every starting capacity, including the
// degenerate capacity-1 table, and preserves exact contents.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_contents(initial in 0usize..=16, n in 1usize..=64) {
        let mut sut = ScatterTable::with_capacity(initial);
        let mut model: HashMap<String, u64> = HashMap::new();

        for i in 0..n {
            let k = format!("key-{i}");
            sut.insert(k.clone(), i as u64).unwrap();
            model.insert(k, i as u64);

            prop_assert!(sut.len() * 2 <= sut.capacity());
            for (k, v) in &model {
                prop_assert_eq!(sut.get(k), Some(*v));
            }
        }
        prop_assert_eq!(sut.len(), n);
    }
}
