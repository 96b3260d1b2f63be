use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

// Small key space so that duplicates, misses and hits all show up often.
#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u16..64")] u16, u32),
    #[proptest(weight = 3)]
    Extract(#[proptest(strategy = "0u16..64")] u16),
    #[proptest(weight = 3)]
    Peek(#[proptest(strategy = "0u16..64")] u16),
    Minimum,
    Maximum,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=600)
}

fn root_key<V>(t: &SplayTree<u16, V>) -> Option<u16> {
    t.root().map(|(k, _)| *k)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_equivalence(ops in ops_strategy()) {
        let mut t: SplayTree<u16, u32> = SplayTree::new();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let expected = if m.contains_key(&key) {
                        Err(Error::DuplicateKey)
                    } else {
                        m.insert(key, value);
                        Ok(())
                    };
                    prop_assert_eq!(t.insert(key, value), expected);
                    if expected.is_ok() {
                        prop_assert_eq!(root_key(&t), Some(key));
                    }
                }
                Op::Extract(key) => {
                    let expected = m.remove(&key).ok_or(Error::NonexistentKey);
                    prop_assert_eq!(t.extract(&key), expected);
                }
                Op::Peek(key) => {
                    let expected = m.get(&key).copied().ok_or(Error::NonexistentKey);
                    prop_assert_eq!(t.peek(&key).copied(), expected);
                    if expected.is_ok() {
                        prop_assert_eq!(root_key(&t), Some(key));
                    }
                }
                Op::Minimum => {
                    let expected = m.keys().next().copied().ok_or(Error::EmptyTree);
                    prop_assert_eq!(t.minimum_key(), expected);
                    prop_assert_eq!(root_key(&t), expected.ok());
                }
                Op::Maximum => {
                    let expected = m.keys().next_back().copied().ok_or(Error::EmptyTree);
                    prop_assert_eq!(t.maximum_key(), expected);
                    prop_assert_eq!(root_key(&t), expected.ok());
                }
            }

            prop_assert_eq!(t.len(), m.len());
            t.assert_valid();
        }

        let got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_map_equivalence(bucket_count in 1usize..9, ops in ops_strategy()) {
        let mut map: AdaptiveHashMap<u16, u32> = AdaptiveHashMap::with_buckets(bucket_count);
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let expected = if m.contains_key(&key) {
                        Err(Error::DuplicateKey)
                    } else {
                        m.insert(key, value);
                        Ok(())
                    };
                    prop_assert_eq!(map.insert(key, value), expected);
                }
                Op::Extract(key) => {
                    let expected = m.remove(&key).ok_or(Error::NonexistentKey);
                    prop_assert_eq!(map.extract(&key), expected);
                }
                Op::Peek(key) => {
                    let expected = m.get(&key).copied().ok_or(Error::NonexistentKey);
                    prop_assert_eq!(map.peek(&key).copied(), expected);
                    if expected.is_ok() {
                        let bucket = map.bucket(map.hash_code(&key));
                        prop_assert_eq!(root_key(bucket), Some(key));
                    }
                }
                // The map has no min/max; treat these as no-ops.
                Op::Minimum | Op::Maximum => {}
            }
            prop_assert_eq!(map.len(), m.len());
        }

        map.assert_valid();
        let mut got: Vec<(u16, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        got.sort_unstable();
        let expected: Vec<(u16, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_extract_everything(keys in prop::collection::btree_set(any::<u16>(), 0..200), seed in any::<u64>()) {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let mut t = SplayTree::new();
        for &k in &keys {
            t.insert(k, u32::from(k)).unwrap();
        }

        let mut order: Vec<u16> = keys.iter().copied().collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        for k in order {
            prop_assert_eq!(t.extract(&k), Ok(u32::from(k)));
            t.assert_valid();
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.root(), None);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u16> = vec![10, 20, 30, 40, 50, 60];

    for_each_permutation(&keys, |perm| {
        let mut t: SplayTree<u16, u16> = SplayTree::new();
        for k in perm {
            t.insert(k, k + 1).unwrap();
            assert_eq!(root_key(&t), Some(k));
            t.assert_valid();
        }
        let got: Vec<u16> = t.keys().copied().collect();
        assert_eq!(got, keys);
        for &k in &keys {
            assert_eq!(t.peek(&k), Ok(&(k + 1)));
            assert_eq!(root_key(&t), Some(k));
        }
    });
}

#[test]
fn exhaustive_extract_order_small_set() {
    let keys: Vec<u16> = vec![10, 20, 30, 40, 50, 60];

    // Insert in a fixed order, then extract in all permutations.
    let mut base: SplayTree<u16, u16> = SplayTree::new();
    for &k in &keys {
        base.insert(k, k + 1).unwrap();
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let mut m: BTreeMap<u16, u16> = keys.iter().map(|&k| (k, k + 1)).collect();

        for k in perm {
            assert_eq!(t.extract(&k).ok(), m.remove(&k));
            assert_eq!(t.len(), m.len());
            t.assert_valid();
            let got: Vec<u16> = t.keys().copied().collect();
            let expected: Vec<u16> = m.keys().copied().collect();
            assert_eq!(got, expected);
        }
        assert!(t.is_empty());
    });
}
