//! Keyed joins over ordered maps with explicit fill values.

use std::collections::BTreeMap;

/// Join two tables on their keys, keeping every key from either side.
///
/// A key present on one side only is paired with the fill value of the
/// other side.
pub fn full_outer_join<K, A, B>(
    left: &BTreeMap<K, A>,
    right: &BTreeMap<K, B>,
    left_fill: A,
    right_fill: B,
) -> BTreeMap<K, (A, B)>
where
    K: Ord + Clone,
    A: Clone,
    B: Clone,
{
    let mut joined: BTreeMap<K, (A, B)> = left
        .iter()
        .map(|(k, a)| {
            let b = right.get(k).cloned().unwrap_or_else(|| right_fill.clone());
            (k.clone(), (a.clone(), b))
        })
        .collect();
    for (k, b) in right {
        if !left.contains_key(k) {
            joined.insert(k.clone(), (left_fill.clone(), b.clone()));
        }
    }
    joined
}

/// Join `right` onto every key of `left`; keys only in `right` are dropped.
pub fn left_join<K, A, B>(left: &BTreeMap<K, A>, right: &BTreeMap<K, B>, fill: B) -> BTreeMap<K, (A, B)>
where
    K: Ord + Clone,
    A: Clone,
    B: Clone,
{
    left.iter()
        .map(|(k, a)| {
            let b = right.get(k).cloned().unwrap_or_else(|| fill.clone());
            (k.clone(), (a.clone(), b))
        })
        .collect()
}
