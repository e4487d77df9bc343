//! Longest increasing subsequence over matched index pairs
//!
//! When identifiers are unique on both sides, the LCS of two identifier
//! sequences is exactly the longest run of matched items whose new indices
//! increase in old order. Patience sorting finds it in O(n log n) with no
//! edit-distance limit.

use rustc_hash::FxHashMap;

/// Longest subsequence of `pairs` (in the given order) with strictly
/// increasing second coordinate.
///
/// On ties the later candidate wins, so an item that stayed in place is
/// preferred over one that jumped ahead of it.
pub(crate) fn longest_increasing(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    if pairs.is_empty() {
        return Vec::new();
    }

    // tails[len] = index into `pairs` of the smallest tail of an increasing run of length len + 1
    let mut tails: Vec<usize> = Vec::with_capacity(pairs.len());
    let mut prev: Vec<Option<usize>> = vec![None; pairs.len()];

    for (i, &(_, new_idx)) in pairs.iter().enumerate() {
        let pos = tails.partition_point(|&t| pairs[t].1 < new_idx);
        prev[i] = pos.checked_sub(1).map(|p| tails[p]);
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.push(pairs[i]);
        cursor = prev[i];
    }

    run.reverse();
    run
}

/// Pair the k-th occurrence of an identifier in `old` with its k-th
/// occurrence in `new`, in old order.
///
/// Used for inputs with duplicate identifiers when the Myers search gives up.
pub(crate) fn occurrence_pairs(old: &[&str], new: &[&str]) -> Vec<(usize, usize)> {
    let mut positions: FxHashMap<&str, (usize, Vec<usize>)> =
        FxHashMap::with_capacity_and_hasher(new.len(), Default::default());
    for (new_idx, &id) in new.iter().enumerate() {
        positions.entry(id).or_default().1.push(new_idx);
    }

    old.iter()
        .enumerate()
        .filter_map(|(old_idx, id)| {
            let (cursor, slots) = positions.get_mut(id)?;
            let new_idx = *slots.get(*cursor)?;
            *cursor += 1;
            Some((old_idx, new_idx))
        })
        .collect()
}
