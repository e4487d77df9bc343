//! Keyed List Diff
//!
//! Computes a minimal edit script between two ordered snapshots of
//! [`Diffable`] items.
//! This is a **pure algorithm module**: no rendering, no toolkit types.
//!
//! # Algorithm
//!
//! 1. Index both snapshots by diff identifier
//! 2. Old-only identifiers are deletes, new-only identifiers are inserts
//! 3. Find the LCS of the identifier sequences: matched items on the LCS
//!    stay, matched items off the LCS move. With unique identifiers this is
//!    the longest increasing run of new positions (patience sorting); with
//!    duplicates Myers resolves the ambiguity
//! 4. Staying items whose content differs are updates
//!
//! # Output Order
//!
//! Deletes (descending old index), inserts (ascending new index), moves and
//! updates (ascending new index). Indices follow batch-update semantics:
//! `old_idx` addresses the old snapshot, `new_idx` the final one.
//!
//! # Complexity
//!
//! - Time: O(n log n) for unique identifiers, O((n + m) * d) with duplicates
//!   where d is the edit distance
//! - Space: O(n + m) for the index maps and the script

use std::cmp::Reverse;

use rustc_hash::FxHashMap;

use crate::item::Diffable;

use super::{lis, myers};

// =============================================================================
// Public Types
// =============================================================================

/// One atomic transform in an edit script.
///
/// `I` is `usize` for flat lists and [`IndexPath`](crate::IndexPath) for rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation<I = usize> {
    /// Insert the new item at `new_idx`
    Insert { new_idx: I },
    /// Delete the old item at `old_idx`
    Delete { old_idx: I },
    /// Move the old item at `old_idx` to `new_idx`, refreshing its content
    Move { old_idx: I, new_idx: I },
    /// Refresh content of the item at `old_idx`, which ends up at `new_idx`
    Update { old_idx: I, new_idx: I },
}

impl<I: Copy> Operation<I> {
    pub fn is_insert(&self) -> bool {
        matches!(self, Operation::Insert { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Operation::Delete { .. })
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Operation::Move { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Operation::Update { .. })
    }

    /// Index in the old snapshot, if the operation reads one.
    pub fn old_index(&self) -> Option<I> {
        match *self {
            Operation::Insert { .. } => None,
            Operation::Delete { old_idx }
            | Operation::Move { old_idx, .. }
            | Operation::Update { old_idx, .. } => Some(old_idx),
        }
    }

    /// Index in the new snapshot, if the operation writes one.
    pub fn new_index(&self) -> Option<I> {
        match *self {
            Operation::Delete { .. } => None,
            Operation::Insert { new_idx }
            | Operation::Move { new_idx, .. }
            | Operation::Update { new_idx, .. } => Some(new_idx),
        }
    }

    /// Convert indices, using `old` for old-snapshot and `new` for
    /// new-snapshot positions.
    pub fn map_index<J>(self, old: impl Fn(I) -> J, new: impl Fn(I) -> J) -> Operation<J> {
        match self {
            Operation::Insert { new_idx } => Operation::Insert { new_idx: new(new_idx) },
            Operation::Delete { old_idx } => Operation::Delete { old_idx: old(old_idx) },
            Operation::Move { old_idx, new_idx } => Operation::Move {
                old_idx: old(old_idx),
                new_idx: new(new_idx),
            },
            Operation::Update { old_idx, new_idx } => Operation::Update {
                old_idx: old(old_idx),
                new_idx: new(new_idx),
            },
        }
    }
}

/// What to emit for an item that both moved and changed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovePolicy {
    /// Emit only the `Move`; the consumer refreshes content at the destination
    #[default]
    AbsorbUpdate,
    /// Emit the `Move` and an `Update` for the same item
    SeparateUpdate,
}

/// Configuration for the diff engine.
#[derive(Debug, Clone, Copy)]
pub struct DiffConfig {
    /// Report reordered items as moves. When false they become
    /// delete + insert pairs.
    /// Default: true
    pub detect_moves: bool,
    /// Handling of items that moved and changed.
    /// Default: [`MovePolicy::AbsorbUpdate`]
    pub move_policy: MovePolicy,
    /// Maximum number of operations before falling back to a full reload.
    /// Default: unbounded
    pub max_ops: Option<usize>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            detect_moves: true,
            move_policy: MovePolicy::AbsorbUpdate,
            max_ops: None,
        }
    }
}

impl DiffConfig {
    /// Default config with an operation budget.
    pub fn bounded(max_ops: usize) -> Self {
        Self {
            max_ops: Some(max_ops),
            ..Self::default()
        }
    }

    /// Default config that reports reorders as delete + insert.
    pub fn without_moves() -> Self {
        Self {
            detect_moves: false,
            ..Self::default()
        }
    }

    pub fn with_move_policy(mut self, move_policy: MovePolicy) -> Self {
        self.move_policy = move_policy;
        self
    }
}

/// Statistics from diff computation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiffStats {
    /// Matched items left in place with equal content
    pub kept: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub moved: usize,
    pub updated: usize,
}

impl DiffStats {
    pub fn edit_count(&self) -> usize {
        self.inserted + self.deleted + self.moved + self.updated
    }

    pub fn is_empty(&self) -> bool {
        self.edit_count() == 0
    }
}

/// Result of diffing two snapshots.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Changeset {
    /// Edit script in application order
    pub ops: Vec<Operation>,
    /// Every identifier-matched `(old_idx, new_idx)` pair, sorted by `new_idx`
    pub matches: Vec<(usize, usize)>,
    /// Whether the script exceeded the budget and the consumer should reload
    pub should_reload: bool,
    /// Reason for reload (if should_reload is true)
    pub reload_reason: Option<String>,
    pub stats: DiffStats,
}

impl Changeset {
    /// Create a changeset that asks for a full reload
    pub fn reload(reason: impl Into<String>) -> Self {
        Self {
            should_reload: true,
            reload_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Check if any changes were detected
    pub fn has_changes(&self) -> bool {
        !self.ops.is_empty() || self.should_reload
    }

    pub fn is_empty(&self) -> bool {
        !self.has_changes()
    }

    pub fn deletes(&self) -> impl Iterator<Item = usize> + '_ {
        self.ops.iter().filter_map(|op| match op {
            Operation::Delete { old_idx } => Some(*old_idx),
            _ => None,
        })
    }

    pub fn inserts(&self) -> impl Iterator<Item = usize> + '_ {
        self.ops.iter().filter_map(|op| match op {
            Operation::Insert { new_idx } => Some(*new_idx),
            _ => None,
        })
    }

    pub fn moves(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            Operation::Move { old_idx, new_idx } => Some((*old_idx, *new_idx)),
            _ => None,
        })
    }

    pub fn updates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            Operation::Update { old_idx, new_idx } => Some((*old_idx, *new_idx)),
            _ => None,
        })
    }

    /// Position in the new snapshot of the item at `old_idx`, if it survived.
    pub fn new_index_of(&self, old_idx: usize) -> Option<usize> {
        self.matches.iter().find(|(o, _)| *o == old_idx).map(|(_, n)| *n)
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff two snapshots with the default configuration.
///
/// ```
/// use collection_diff::{compute_diff, Keyed, Operation};
///
/// let old = vec![Keyed::new("a", 1), Keyed::new("b", 1), Keyed::new("c", 1)];
/// let new = vec![Keyed::new("b", 1), Keyed::new("c", 1), Keyed::new("a", 1)];
///
/// let changes = compute_diff(&old, &new);
/// assert_eq!(changes.ops, vec![Operation::Move { old_idx: 0, new_idx: 2 }]);
/// ```
pub fn compute_diff<T: Diffable>(old: &[T], new: &[T]) -> Changeset {
    compute_diff_with_config(old, new, DiffConfig::default())
}

/// Diff two snapshots with a custom configuration.
pub fn compute_diff_with_config<T: Diffable>(old: &[T], new: &[T], config: DiffConfig) -> Changeset {
    let old_ids: Vec<&str> = old.iter().map(Diffable::diff_identifier).collect();
    let new_ids: Vec<&str> = new.iter().map(Diffable::diff_identifier).collect();

    let old_map = index_map(&old_ids);
    let new_map = index_map(&new_ids);
    warn_on_duplicates(old_ids.len() - old_map.len(), "old");
    warn_on_duplicates(new_ids.len() - new_map.len(), "new");

    let common = if old_map.len() == old_ids.len() && new_map.len() == new_ids.len() {
        let pairs: Vec<(usize, usize)> = old_ids
            .iter()
            .enumerate()
            .filter_map(|(old_idx, id)| new_map.get(id).map(|&new_idx| (old_idx, new_idx)))
            .collect();
        lis::longest_increasing(&pairs)
    } else {
        myers::lcs(&old_ids, &new_ids).unwrap_or_else(|| {
            tracing::debug!(
                old = old_ids.len(),
                new = new_ids.len(),
                "pairing duplicate identifiers by occurrence"
            );
            lis::longest_increasing(&lis::occurrence_pairs(&old_ids, &new_ids))
        })
    };

    let mut ctx = DiffContext::new(old.len(), new.len(), config);

    // LCS pairs stay in place
    for &(old_idx, new_idx) in &common {
        ctx.keep(old_idx, new_idx, old[old_idx].is_content_equal(&new[new_idx]));
    }

    // Old items off the LCS: moved or deleted
    for (old_idx, id) in old_ids.iter().enumerate() {
        if ctx.old_claimed[old_idx] {
            continue;
        }
        match new_map.get(id) {
            Some(&new_idx) if !ctx.new_claimed[new_idx] => {
                let equal = old[old_idx].is_content_equal(&new[new_idx]);
                ctx.relocate(old_idx, new_idx, equal);
            }
            _ => ctx.delete(old_idx),
        }
    }

    // New items nobody claimed are inserts. This also covers duplicate
    // identifiers whose first occurrence was already matched.
    for new_idx in 0..new.len() {
        if !ctx.new_claimed[new_idx] {
            ctx.insert(new_idx);
        }
    }

    ctx.into_changeset()
}

// =============================================================================
// Internal Context
// =============================================================================

struct DiffContext {
    deletes: Vec<usize>,
    inserts: Vec<usize>,
    moves: Vec<(usize, usize)>,
    updates: Vec<(usize, usize)>,
    matches: Vec<(usize, usize)>,
    old_claimed: Vec<bool>,
    new_claimed: Vec<bool>,
    stats: DiffStats,
    config: DiffConfig,
}

impl DiffContext {
    fn new(old_len: usize, new_len: usize, config: DiffConfig) -> Self {
        Self {
            deletes: Vec::new(),
            inserts: Vec::new(),
            moves: Vec::new(),
            updates: Vec::new(),
            matches: Vec::with_capacity(old_len.min(new_len)),
            old_claimed: vec![false; old_len],
            new_claimed: vec![false; new_len],
            stats: DiffStats::default(),
            config,
        }
    }

    fn keep(&mut self, old_idx: usize, new_idx: usize, equal: bool) {
        self.claim(old_idx, new_idx);
        if equal {
            self.stats.kept += 1;
        } else {
            self.updates.push((old_idx, new_idx));
            self.stats.updated += 1;
        }
    }

    fn relocate(&mut self, old_idx: usize, new_idx: usize, equal: bool) {
        if !self.config.detect_moves {
            // Leave new_idx unclaimed so the insert pass picks it up
            self.delete(old_idx);
            return;
        }

        self.claim(old_idx, new_idx);
        self.moves.push((old_idx, new_idx));
        self.stats.moved += 1;

        if !equal && self.config.move_policy == MovePolicy::SeparateUpdate {
            self.updates.push((old_idx, new_idx));
            self.stats.updated += 1;
        }
    }

    fn delete(&mut self, old_idx: usize) {
        self.old_claimed[old_idx] = true;
        self.deletes.push(old_idx);
        self.stats.deleted += 1;
    }

    fn insert(&mut self, new_idx: usize) {
        self.new_claimed[new_idx] = true;
        self.inserts.push(new_idx);
        self.stats.inserted += 1;
    }

    fn claim(&mut self, old_idx: usize, new_idx: usize) {
        self.old_claimed[old_idx] = true;
        self.new_claimed[new_idx] = true;
        self.matches.push((old_idx, new_idx));
    }

    fn into_changeset(mut self) -> Changeset {
        self.deletes.sort_unstable_by_key(|&i| Reverse(i));
        self.inserts.sort_unstable();
        self.moves.sort_unstable_by_key(|&(_, new_idx)| new_idx);
        self.updates.sort_unstable_by_key(|&(_, new_idx)| new_idx);
        self.matches.sort_unstable_by_key(|&(_, new_idx)| new_idx);

        let op_count = self.deletes.len() + self.inserts.len() + self.moves.len() + self.updates.len();

        if let Some(max_ops) = self.config.max_ops
            && op_count > max_ops
        {
            tracing::warn!(op_count, max_ops, "diff exceeds operation budget, requesting reload");
            return Changeset::reload(format!("{op_count} operations exceed limit of {max_ops}"));
        }

        let mut ops = Vec::with_capacity(op_count);
        ops.extend(self.deletes.into_iter().map(|old_idx| Operation::Delete { old_idx }));
        ops.extend(self.inserts.into_iter().map(|new_idx| Operation::Insert { new_idx }));
        ops.extend(
            self.moves
                .into_iter()
                .map(|(old_idx, new_idx)| Operation::Move { old_idx, new_idx }),
        );
        ops.extend(
            self.updates
                .into_iter()
                .map(|(old_idx, new_idx)| Operation::Update { old_idx, new_idx }),
        );

        tracing::debug!(
            kept = self.stats.kept,
            inserted = self.stats.inserted,
            deleted = self.stats.deleted,
            moved = self.stats.moved,
            updated = self.stats.updated,
            "computed diff"
        );

        Changeset {
            ops,
            matches: self.matches,
            should_reload: false,
            reload_reason: None,
            stats: self.stats,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map identifiers to their first position.
fn index_map<'a>(ids: &[&'a str]) -> FxHashMap<&'a str, usize> {
    let mut map = FxHashMap::with_capacity_and_hasher(ids.len(), Default::default());
    for (idx, &id) in ids.iter().enumerate() {
        map.entry(id).or_insert(idx);
    }
    map
}

fn warn_on_duplicates(duplicates: usize, side: &'static str) {
    if duplicates > 0 {
        tracing::warn!(side, duplicates, "duplicate diff identifiers, result is best-effort");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Keyed;
    use crate::test_capture;

    fn items(entries: &[(&str, u32)]) -> Vec<Keyed<u32>> {
        entries.iter().map(|&(id, v)| Keyed::new(id, v)).collect()
    }

    fn ids(names: &[&str]) -> Vec<Keyed<u32>> {
        names.iter().map(|&id| Keyed::new(id, 0)).collect()
    }

    #[test]
    fn test_empty_sequences() {
        let result = compute_diff::<Keyed<u32>>(&[], &[]);
        assert!(result.ops.is_empty());
        assert!(result.stats.is_empty());
        assert!(!result.has_changes());
    }

    #[test]
    fn test_insert_all() {
        let result = compute_diff(&[], &ids(&["a", "b", "c"]));
        assert_eq!(
            result.ops,
            vec![
                Operation::Insert { new_idx: 0 },
                Operation::Insert { new_idx: 1 },
                Operation::Insert { new_idx: 2 },
            ]
        );
        assert_eq!(result.stats.inserted, 3);
    }

    #[test]
    fn test_delete_all_descending() {
        let result = compute_diff(&ids(&["a", "b", "c"]), &[]);
        assert_eq!(
            result.ops,
            vec![
                Operation::Delete { old_idx: 2 },
                Operation::Delete { old_idx: 1 },
                Operation::Delete { old_idx: 0 },
            ]
        );
    }

    #[test]
    fn test_no_changes() {
        let old = ids(&["a", "b", "c"]);
        let result = compute_diff(&old, &old.clone());
        assert!(result.ops.is_empty());
        assert_eq!(result.stats.kept, 3);
        assert_eq!(result.matches, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_rotation_is_single_move() {
        let result = compute_diff(&ids(&["a", "b", "c"]), &ids(&["b", "c", "a"]));
        assert_eq!(result.ops, vec![Operation::Move { old_idx: 0, new_idx: 2 }]);
        assert_eq!(result.stats.moved, 1);
        assert_eq!(result.stats.inserted + result.stats.deleted, 0);
    }

    #[test]
    fn test_replace_tail_item() {
        let result = compute_diff(&ids(&["a", "b"]), &ids(&["a", "c"]));
        assert_eq!(
            result.ops,
            vec![Operation::Delete { old_idx: 1 }, Operation::Insert { new_idx: 1 }]
        );
    }

    #[test]
    fn test_content_change_is_update() {
        let result = compute_diff(&items(&[("a", 1)]), &items(&[("a", 2)]));
        assert_eq!(result.ops, vec![Operation::Update { old_idx: 0, new_idx: 0 }]);
    }

    #[test]
    fn test_update_after_shift_keeps_both_indices() {
        let old = items(&[("x", 0), ("a", 1)]);
        let new = items(&[("a", 2)]);
        let result = compute_diff(&old, &new);
        assert_eq!(
            result.ops,
            vec![Operation::Delete { old_idx: 0 }, Operation::Update { old_idx: 1, new_idx: 0 }]
        );
    }

    #[test]
    fn test_move_absorbs_update_by_default() {
        let old = items(&[("a", 1), ("b", 1), ("c", 1)]);
        let new = items(&[("b", 1), ("c", 1), ("a", 9)]);
        let result = compute_diff(&old, &new);
        assert_eq!(result.ops, vec![Operation::Move { old_idx: 0, new_idx: 2 }]);
        assert_eq!(result.stats.updated, 0);
    }

    #[test]
    fn test_separate_update_policy() {
        let old = items(&[("a", 1), ("b", 1), ("c", 1)]);
        let new = items(&[("b", 1), ("c", 1), ("a", 9)]);
        let config = DiffConfig::default().with_move_policy(MovePolicy::SeparateUpdate);
        let result = compute_diff_with_config(&old, &new, config);
        assert_eq!(
            result.ops,
            vec![
                Operation::Move { old_idx: 0, new_idx: 2 },
                Operation::Update { old_idx: 0, new_idx: 2 },
            ]
        );
    }

    #[test]
    fn test_without_moves_uses_delete_insert() {
        let result = compute_diff_with_config(
            &ids(&["a", "b", "c"]),
            &ids(&["b", "c", "a"]),
            DiffConfig::without_moves(),
        );
        assert_eq!(
            result.ops,
            vec![Operation::Delete { old_idx: 0 }, Operation::Insert { new_idx: 2 }]
        );
        assert_eq!(result.matches, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_mixed_operations_order() {
        // delete b, d; insert e; move a to the end; update c
        let old = items(&[("a", 0), ("b", 0), ("c", 0), ("d", 0)]);
        let new = items(&[("c", 1), ("e", 0), ("a", 0)]);
        let result = compute_diff(&old, &new);
        assert_eq!(
            result.ops,
            vec![
                Operation::Delete { old_idx: 3 },
                Operation::Delete { old_idx: 1 },
                Operation::Insert { new_idx: 1 },
                Operation::Move { old_idx: 0, new_idx: 2 },
                Operation::Update { old_idx: 2, new_idx: 0 },
            ]
        );
        assert_eq!(result.new_index_of(0), Some(2));
        assert_eq!(result.new_index_of(1), None);
    }

    #[test]
    fn test_budget_triggers_reload() {
        let result = compute_diff_with_config(&ids(&["a", "b"]), &ids(&["c", "d"]), DiffConfig::bounded(3));
        assert!(result.should_reload);
        assert!(result.ops.is_empty());
        assert!(result.has_changes());
        assert!(result.reload_reason.is_some_and(|r| r.contains("limit of 3")));
    }

    #[test]
    fn test_budget_not_hit() {
        let result = compute_diff_with_config(&ids(&["a"]), &ids(&["b"]), DiffConfig::bounded(2));
        assert!(!result.should_reload);
        assert_eq!(result.ops.len(), 2);
    }

    #[test]
    fn test_duplicates_do_not_panic() {
        let old = ids(&["a", "a", "b"]);
        let new = ids(&["b", "a", "a", "a"]);
        let result = compute_diff(&old, &new);
        let survivors = old.len() - result.stats.deleted - result.stats.moved;
        assert_eq!(survivors + result.stats.inserted + result.stats.moved, new.len());
    }

    /// Every fourth id replaced: hundreds of edits, but survivors never move.
    fn scattered_replacements(len: usize) -> (Vec<Keyed<u32>>, Vec<Keyed<u32>>) {
        let old = (0..len).map(|i| Keyed::new(format!("k{i}"), 0)).collect();
        let new = (0..len)
            .map(|i| match i % 4 {
                1 => Keyed::new(format!("n{i}"), 0),
                _ => Keyed::new(format!("k{i}"), 0),
            })
            .collect();
        (old, new)
    }

    #[test]
    fn test_scattered_replacements_past_edit_limit_stay_in_place() {
        let (old, new) = scattered_replacements(1200);
        let result = compute_diff(&old, &new);

        assert_eq!(result.stats.kept, 900);
        assert_eq!(result.stats.moved, 0);
        assert_eq!(result.stats.deleted, 300);
        assert_eq!(result.stats.inserted, 300);
        assert!(result.moves().all(|(o, n)| o != n));
        assert!(result.matches.iter().all(|&(o, n)| o == n));
    }

    #[test]
    fn test_duplicates_past_edit_limit_pair_by_occurrence() {
        let (mut old, mut new) = scattered_replacements(1200);
        old.insert(0, Keyed::new("dup", 0));
        old.insert(0, Keyed::new("dup", 0));
        new.insert(0, Keyed::new("dup", 0));
        new.insert(0, Keyed::new("dup", 0));

        let result = compute_diff(&old, &new);

        assert_eq!(result.stats.kept, 902);
        assert_eq!(result.stats.moved, 0);
        assert_eq!(result.stats.deleted + result.stats.inserted, 600);
    }

    #[test]
    fn test_duplicate_identifiers_log_a_warning() {
        let old = ids(&["a", "b"]);
        let new = ids(&["a", "a", "b", "a"]);

        let (_, events) = test_capture::capture(|| compute_diff(&old, &new));
        let warnings: Vec<_> = events.iter().filter(|e| e.level == tracing::Level::WARN).collect();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("duplicate diff identifiers"));
        assert_eq!(warnings[0].field("side"), Some("new"));
        assert_eq!(warnings[0].field("duplicates"), Some("2"));
    }

    #[test]
    fn test_unique_identifiers_do_not_warn() {
        let (_, events) = test_capture::capture(|| compute_diff(&ids(&["a", "b"]), &ids(&["b", "c"])));
        assert!(events.iter().all(|e| e.level != tracing::Level::WARN));
    }

    #[test]
    fn test_operation_accessors() {
        let op = Operation::Move { old_idx: 1, new_idx: 4 };
        assert!(op.is_move());
        assert!(!op.is_update());
        assert_eq!(op.old_index(), Some(1));
        assert_eq!(op.new_index(), Some(4));
        assert_eq!(Operation::Insert { new_idx: 3 }.old_index(), None);
        assert_eq!(Operation::<usize>::Delete { old_idx: 3 }.new_index(), None);

        let mapped = op.map_index(|i| i * 10, |i| i + 100);
        assert_eq!(mapped, Operation::Move { old_idx: 10, new_idx: 104 });
    }
}
