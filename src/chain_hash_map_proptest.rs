#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can walk the
// internal layout through `assert_invariants`.

use crate::chain_hash_map::ChainHashMap;
use crate::config::Config;
use crate::key_ops::{FnKeys, KeyOps, StrKeys};
use crate::release::Release;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Take(usize),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            1 => idx.clone().prop_map(OpI::Get),
            1 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Take),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Records released values so the model can check exactly-once delivery.
#[derive(Clone, Default)]
struct Sink(Rc<RefCell<Vec<i32>>>);

impl Release<i32> for Sink {
    fn release(&mut self, item: i32) {
        self.0.borrow_mut().push(item);
    }
}

fn run_state_machine<O>(
    ops_impl: O,
    config: Config,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    O: KeyOps<String>,
{
    let sink = Sink::default();
    let mut sut = ChainHashMap::with_config(ops_impl, |_: String| {}, sink.clone(), config)
        .expect("allocate buckets");
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut expected_released: Vec<i32> = Vec::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i].clone();
                if let Some(old) = model.insert(k.clone(), v) {
                    expected_released.push(old);
                }
                prop_assert!(sut.put(k, v).is_ok());
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let before = sut.len();
                match model.remove(k) {
                    Some(old) => {
                        expected_released.push(old);
                        prop_assert!(sut.remove(k));
                        prop_assert_eq!(sut.len(), before - 1);
                    }
                    None => {
                        prop_assert!(!sut.remove(k));
                        prop_assert_eq!(sut.len(), before);
                    }
                }
                prop_assert!(sut.get(k).is_none());
            }
            OpI::Take(i) => {
                let k = &pool[i];
                let taken = sut.take(k);
                let expected = model.remove(k).map(|v| (k.clone(), v));
                prop_assert_eq!(taken, expected);
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence diverged for {:?}", k),
                }
            }
            OpI::Iterate => {
                let s_pairs: BTreeSet<_> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m_pairs: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s_pairs, m_pairs);
            }
        }

        // Post-conditions after each op
        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let released = sink.0.borrow().clone();
        prop_assert_eq!(released, expected_released.clone());
    }

    // Dropping releases every remaining value exactly once.
    drop(sut);
    expected_released.extend(model.values().copied());
    let mut got = sink.0.borrow().clone();
    got.sort_unstable();
    expected_released.sort_unstable();
    prop_assert_eq!(got, expected_released);
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` inserts or replaces; replaced values reach the release hook once.
// - `get`/`contains_key`/`get_mut` parity with the model.
// - `remove` reports presence, decrements len by exactly one, releases once.
// - `take` returns the owned pair and never releases.
// - `iter` yields exactly the model's pairs.
// - Structural invariants (slot placement, count, no orphaned nodes) hold
//   after every op, including across resizes from a tiny initial capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(StrKeys, Config::default(), pool, ops)?;
    }

    #[test]
    fn prop_state_machine_growing((pool, ops) in arb_scenario()) {
        let config = Config::new().initial_capacity(1).fill_rate(0.6);
        run_state_machine(StrKeys, config, pool, ops)?;
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hash). Every key shares one slot, which
// stresses head promotion and chain relinking on removal.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let constant = FnKeys::new(|_: &String| 0u32, |a: &String, b: &String| a == b);
        run_state_machine(constant, Config::new().initial_capacity(2), pool, ops)?;
    }
}
