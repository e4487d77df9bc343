//! Replaying an edit script.
//!
//! Uses batch-update semantics: deletes and move sources address the old
//! snapshot, inserts and move destinations address the final one. Old items
//! that are neither deleted nor moved keep their relative order and fill the
//! positions nobody else claims.

use std::collections::BTreeMap;

use super::diff::Operation;

/// Apply `ops` to `old`, taking inserted and refreshed content from `new`.
///
/// Operations with out-of-range indices are skipped.
///
/// ```
/// use collection_diff::{apply, compute_diff, Keyed};
///
/// let old = vec![Keyed::new("a", 1), Keyed::new("b", 1)];
/// let new = vec![Keyed::new("b", 2), Keyed::new("c", 1), Keyed::new("a", 1)];
///
/// let changes = compute_diff(&old, &new);
/// assert_eq!(apply(&old, &new, &changes.ops), new);
/// ```
pub fn apply<T: Clone>(old: &[T], new: &[T], ops: &[Operation]) -> Vec<T> {
    let mut removed = vec![false; old.len()];
    let mut placed: BTreeMap<usize, T> = BTreeMap::new();
    let mut updates: Vec<usize> = Vec::new();

    for op in ops {
        match *op {
            Operation::Delete { old_idx } => {
                if !guard(old_idx, old.len(), op) {
                    continue;
                }
                removed[old_idx] = true;
            }
            Operation::Insert { new_idx } => {
                if !guard(new_idx, new.len(), op) {
                    continue;
                }
                placed.insert(new_idx, new[new_idx].clone());
            }
            Operation::Move { old_idx, new_idx } => {
                if !guard(old_idx, old.len(), op) || !guard(new_idx, new.len(), op) {
                    continue;
                }
                removed[old_idx] = true;
                placed.insert(new_idx, new[new_idx].clone());
            }
            Operation::Update { old_idx, new_idx } => {
                if !guard(old_idx, old.len(), op) || !guard(new_idx, new.len(), op) {
                    continue;
                }
                updates.push(new_idx);
            }
        }
    }

    let mut survivors = old
        .iter()
        .zip(&removed)
        .filter(|&(_, removed)| !removed)
        .map(|(item, _)| item.clone());

    let len = old.len() - removed.iter().filter(|r| **r).count() + placed.len();
    let mut result = Vec::with_capacity(len);

    for idx in 0..len {
        let next = match placed.remove(&idx) {
            Some(item) => Some(item),
            None => survivors.next(),
        };
        match next {
            Some(item) => result.push(item),
            None => break,
        }
    }

    // Placements past the end (inconsistent scripts) are appended in order.
    result.extend(placed.into_values());

    for new_idx in updates {
        if let Some(slot) = result.get_mut(new_idx) {
            *slot = new[new_idx].clone();
        }
    }

    result
}

fn guard(idx: usize, len: usize, op: &Operation) -> bool {
    if idx < len {
        return true;
    }
    tracing::warn!(?op, idx, len, "skipping out-of-range operation");
    false
}
