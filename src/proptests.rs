use super::*;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Add(i32, u64),
    Remove(i32),
    Find(i32),
    Range(i32, i32),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // A narrow key space so removals and duplicate adds actually hit
    let key = -64i32..=256;
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Add(k, v)),
        30 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Find),
        5 => (key.clone(), key).prop_map(|(a, b)| Op::Range(a, b)),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn apply_ops(
    collection: &mut dyn Collection<i32, u64>,
    ops: Vec<Op>,
) -> Result<BTreeMap<i32, u64>, TestCaseError> {
    let mut m: BTreeMap<i32, u64> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Add(key, value) => {
                let added = collection.add(key, value);
                prop_assert_eq!(added, !m.contains_key(&key));
                m.entry(key).or_insert(value);
            }
            Op::Remove(key) => {
                prop_assert_eq!(collection.remove(&key), m.remove(&key));
            }
            Op::Find(key) => {
                prop_assert_eq!(collection.find(&key).copied(), m.get(&key).copied());
            }
            Op::Range(k1, k2) => {
                let mut got: Vec<i32> = Vec::new();
                collection.find_range(&k1, &k2, &mut got);
                let expected: Vec<i32> = if k1 <= k2 {
                    m.range(k1..=k2).map(|(k, _)| *k).collect()
                } else {
                    Vec::new()
                };
                prop_assert_eq!(got, expected);
            }
        }

        prop_assert_eq!(collection.size(), m.len());
    }

    let mut keys: Vec<i32> = Vec::new();
    collection.keys(&mut keys);
    let expected: Vec<i32> = m.keys().copied().collect();
    prop_assert_eq!(keys, expected);
    Ok(m)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_avl_matches_btree_map(ops in ops_strategy()) {
        let mut avl: AvlCollection<i32, u64> = AvlCollection::new();
        let m = apply_ops(&mut avl, ops)?;

        prop_assert_eq!(avl.validate(), Ok(()));
        let got: Vec<(i32, u64)> = avl.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, u64)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_rbt_matches_btree_map(ops in ops_strategy()) {
        let mut rbt: RbtCollection<i32, u64> = RbtCollection::new();
        let m = apply_ops(&mut rbt, ops)?;

        prop_assert_eq!(rbt.validate(), Ok(()));
        let got: Vec<(i32, u64)> = rbt.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, u64)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_insert_order_does_not_matter(keys in prop::collection::vec(any::<i32>(), 0..=300)) {
        let avl: AvlCollection<i32, ()> = keys.iter().map(|&k| (k, ())).collect();
        let rbt: RbtCollection<i32, ()> = keys.iter().rev().map(|&k| (k, ())).collect();

        let mut expected = keys.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert!(avl.iter().map(|(k, _)| *k).eq(expected.iter().copied()));
        prop_assert!(rbt.iter().map(|(k, _)| *k).eq(expected.iter().copied()));
        prop_assert!(rbt.valid());
        prop_assert_eq!(avl.validate(), Ok(()));
    }
}
