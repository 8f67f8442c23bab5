#![cfg(test)]

// Property tests for Table kept inside the crate so they can inspect the
// slot array directly.

use crate::hash::slot_for;
use crate::slot::Slot;
use crate::table::{Table, INITIAL_CAPACITY};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Save(usize, i32),
    Delete(usize),
    Get(usize),
    Contains(String),
    Iterate,
    Walk,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=240).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Save(i, v)),
            3 => idx.clone().prop_map(OpI::Delete),
            2 => idx.clone().prop_map(OpI::Get),
            1 => "[a-z]{0,6}".prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Walk),
        ];
        proptest::collection::vec(op, 1..400).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Structural checks on the slot array:
// - every occupied key is unique;
// - no empty slot lies between a key's home slot and its actual slot;
// - occupied slots match `count`;
// - capacity is the floor times a power of two.
fn check_slots<V>(t: &Table<V>) -> Result<(), TestCaseError> {
    let slots = t.slots();
    let cap = slots.len();
    prop_assert!(cap >= INITIAL_CAPACITY);
    prop_assert!(cap % INITIAL_CAPACITY == 0 && (cap / INITIAL_CAPACITY).is_power_of_two());

    let mut keys = HashSet::new();
    for (pos, slot) in slots.iter().enumerate() {
        if let Slot::Occupied { key, .. } = slot {
            prop_assert!(keys.insert(key.as_str()), "duplicate slot for {:?}", key);
            let mut p = slot_for(key, cap);
            while p != pos {
                prop_assert!(
                    !matches!(slots[p], Slot::Empty),
                    "empty slot {} on the probe path of {:?}",
                    p,
                    key
                );
                p = (p + 1) % cap;
            }
        }
    }
    prop_assert_eq!(keys.len(), t.count());
    prop_assert!(t.count() < cap);
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `save` inserts or overwrites; `get` returns the latest value.
// - `delete` returns the model's value and the key becomes absent.
// - `contains` parity with the model for pool and random keys.
// - `iter` and the cursor yield each live key exactly once.
// - Slot-array structure holds after every operation (see `check_slots`).
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: Table<i32> = Table::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Save(i, v) => {
                    let k = &pool[i];
                    sut.save(k, v).expect("small tables allocate");
                    model.insert(k.clone(), v);
                    prop_assert_eq!(sut.get(k), Some(&v));
                }
                OpI::Delete(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.delete(k), model.remove(k));
                    prop_assert!(sut.get(k).is_none());
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k));
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
                }
                OpI::Iterate => {
                    let s_keys: Vec<&str> = sut.keys().collect();
                    let unique: BTreeSet<&str> = s_keys.iter().copied().collect();
                    prop_assert_eq!(unique.len(), s_keys.len());
                    let m_keys: BTreeSet<&str> = model.keys().map(String::as_str).collect();
                    prop_assert_eq!(unique, m_keys);
                }
                OpI::Walk => {
                    let mut c = sut.cursor();
                    let mut seen = BTreeSet::new();
                    while let Some((k, v)) = c.current_entry() {
                        prop_assert!(seen.insert(k.to_string()));
                        prop_assert_eq!(model.get(k), Some(v));
                        prop_assert!(c.advance());
                    }
                    prop_assert!(c.at_end());
                    prop_assert_eq!(seen.len(), model.len());
                }
            }

            check_slots(&sut)?;
            prop_assert_eq!(sut.count(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Property: destructor accounting.
// Every value the table ever held is either returned by `delete`, passed to
// the destructor on overwrite, or passed to the destructor at teardown.
// Nothing is handed out twice and nothing is lost.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_destructor_accounting((pool, ops) in arb_scenario()) {
        let disposed = Rc::new(RefCell::new(Vec::new()));
        let sink = disposed.clone();
        let mut sut: Table<u64> = Table::with_destructor(move |v| sink.borrow_mut().push(v));

        // Unique values so each one can be traced.
        let mut next = 0u64;
        let mut returned = Vec::new();
        for op in ops {
            match op {
                OpI::Save(i, _) => {
                    sut.save(&pool[i], next).expect("small tables allocate");
                    next += 1;
                }
                OpI::Delete(i) => returned.extend(sut.delete(&pool[i])),
                _ => {}
            }
        }
        let overwritten = disposed.borrow().len();
        let live = sut.count();
        sut.destroy();

        let mut all: Vec<u64> = disposed.borrow().clone();
        prop_assert_eq!(all.len(), overwritten + live);
        all.extend(returned);
        all.sort_unstable();
        prop_assert_eq!(all, (0..next).collect::<Vec<_>>());
    }
}
