//! Two-level section/cell diffing
//!
//! Sections are diffed by identifier first. Every section present in both
//! snapshots (kept in place or moved) then gets its cells diffed, producing
//! row operations addressed by [`IndexPath`]:
//!
//! - row deletes and move sources use the **old** section index,
//! - row inserts, move destinations and updates use the **new** one.
//!
//! Cells of inserted or deleted sections produce no row operations; the
//! section operation covers them. A cell that changes sections shows up as a
//! delete in one and an insert in the other.

use compact_str::CompactString;

use crate::algo::{apply, compute_diff_with_config, Changeset, DiffConfig, Operation};
use crate::index_path::IndexPath;
use crate::item::Diffable;

// =============================================================================
// Section trait
// =============================================================================

/// A diffable section owning an ordered list of diffable cells.
///
/// The section's own [`Diffable::is_content_equal`] covers section-level
/// attributes only (header, footer, insets...). Cells are compared separately.
pub trait DiffableSection: Diffable {
    type Cell: Diffable;

    fn cells(&self) -> &[Self::Cell];

    fn cells_mut(&mut self) -> &mut Vec<Self::Cell>;
}

/// A ready-made section: identifier, optional title and cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<C> {
    pub id: CompactString,
    pub title: Option<CompactString>,
    pub cells: Vec<C>,
}

impl<C> Section<C> {
    pub fn new(id: impl Into<CompactString>, cells: Vec<C>) -> Self {
        Self {
            id: id.into(),
            title: None,
            cells,
        }
    }

    pub fn with_title(mut self, title: impl Into<CompactString>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl<C> Diffable for Section<C> {
    fn diff_identifier(&self) -> &str {
        &self.id
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl<C: Diffable> DiffableSection for Section<C> {
    type Cell = C;

    fn cells(&self) -> &[C] {
        &self.cells
    }

    fn cells_mut(&mut self) -> &mut Vec<C> {
        &mut self.cells
    }
}

// =============================================================================
// Batch update
// =============================================================================

/// Cell changes inside one matched section.
#[derive(Debug, Clone)]
pub struct RowChangeset {
    pub old_section: usize,
    pub new_section: usize,
    pub changeset: Changeset,
}

impl RowChangeset {
    /// Row operations addressed by index path.
    pub fn operations(&self) -> impl Iterator<Item = Operation<IndexPath>> + '_ {
        let (old_section, new_section) = (self.old_section, self.new_section);
        self.changeset.ops.iter().map(move |op| {
            op.map_index(
                |row| IndexPath::new(old_section, row),
                |row| IndexPath::new(new_section, row),
            )
        })
    }
}

/// Section and row changes between two snapshots.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct BatchUpdate {
    /// Section-level changes
    pub sections: Changeset,
    /// Row-level changes, one entry per matched section, ordered by new section
    pub rows: Vec<RowChangeset>,
}

impl BatchUpdate {
    /// Check if any section or row changes were detected
    pub fn has_changes(&self) -> bool {
        self.sections.has_changes() || self.rows.iter().any(|r| r.changeset.has_changes())
    }

    /// Whether either level exceeded the operation budget
    pub fn should_reload(&self) -> bool {
        self.sections.should_reload || self.rows.iter().any(|r| r.changeset.should_reload)
    }

    /// All row operations, ordered by new section.
    pub fn row_operations(&self) -> impl Iterator<Item = Operation<IndexPath>> + '_ {
        self.rows.iter().flat_map(|rows| rows.operations())
    }

    /// Row changes of the section that ends up at `new_section`.
    pub fn rows_for(&self, new_section: usize) -> Option<&RowChangeset> {
        self.rows.iter().find(|r| r.new_section == new_section)
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Diff two section snapshots with the default configuration.
///
/// ```
/// use collection_diff::{diff_sections, IndexPath, Keyed, Operation, Section};
///
/// let old = vec![Section::new("s", vec![Keyed::new("a", 0), Keyed::new("b", 0)])];
/// let new = vec![Section::new("s", vec![Keyed::new("b", 0)])];
///
/// let update = diff_sections(&old, &new);
/// assert!(update.sections.ops.is_empty());
/// assert_eq!(
///     update.row_operations().collect::<Vec<_>>(),
///     vec![Operation::Delete { old_idx: IndexPath::new(0, 0) }]
/// );
/// ```
pub fn diff_sections<S: DiffableSection>(old: &[S], new: &[S]) -> BatchUpdate {
    diff_sections_with_config(old, new, DiffConfig::default())
}

/// Diff two section snapshots; `config` applies to both levels.
pub fn diff_sections_with_config<S: DiffableSection>(old: &[S], new: &[S], config: DiffConfig) -> BatchUpdate {
    let sections = compute_diff_with_config(old, new, config);
    let rows = sections
        .matches
        .iter()
        .map(|&(old_idx, new_idx)| diff_rows(&old[old_idx], &new[new_idx], old_idx, new_idx, config))
        .collect();

    finish(sections, rows)
}

/// Like [`diff_sections_with_config`], diffing matched sections on the rayon pool.
#[cfg(feature = "parallel")]
pub fn diff_sections_par<S>(old: &[S], new: &[S], config: DiffConfig) -> BatchUpdate
where
    S: DiffableSection + Sync,
    S::Cell: Sync,
{
    use rayon::prelude::*;

    let sections = compute_diff_with_config(old, new, config);
    let rows = sections
        .matches
        .par_iter()
        .map(|&(old_idx, new_idx)| diff_rows(&old[old_idx], &new[new_idx], old_idx, new_idx, config))
        .collect();

    finish(sections, rows)
}

/// Replay a batch update: section operations decide which old section ends
/// up where, row operations rebuild the cells of every matched section.
pub fn apply_batch<S>(old: &[S], new: &[S], update: &BatchUpdate) -> Vec<S>
where
    S: DiffableSection + Clone,
    S::Cell: Clone,
{
    if update.sections.should_reload {
        return new.to_vec();
    }

    let mut result = apply(old, new, &update.sections.ops);

    for rows in &update.rows {
        let (Some(old_section), Some(new_section)) = (old.get(rows.old_section), new.get(rows.new_section)) else {
            tracing::warn!(
                old_section = rows.old_section,
                new_section = rows.new_section,
                "skipping rows of unknown section"
            );
            continue;
        };
        let Some(target) = result.get_mut(rows.new_section) else {
            continue;
        };
        *target.cells_mut() = if rows.changeset.should_reload {
            new_section.cells().to_vec()
        } else {
            apply(old_section.cells(), new_section.cells(), &rows.changeset.ops)
        };
    }

    result
}

// =============================================================================
// Helper Functions
// =============================================================================

fn diff_rows<S: DiffableSection>(
    old: &S,
    new: &S,
    old_section: usize,
    new_section: usize,
    config: DiffConfig,
) -> RowChangeset {
    RowChangeset {
        old_section,
        new_section,
        changeset: compute_diff_with_config(old.cells(), new.cells(), config),
    }
}

fn finish(sections: Changeset, rows: Vec<RowChangeset>) -> BatchUpdate {
    let row_ops: usize = rows.iter().map(|r| r.changeset.ops.len()).sum();
    tracing::debug!(
        section_ops = sections.ops.len(),
        row_ops,
        matched_sections = rows.len(),
        "computed batch update"
    );
    BatchUpdate { sections, rows }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Keyed;

    type Cell = Keyed<u8>;

    fn section(id: &str, cells: &[(&str, u8)]) -> Section<Cell> {
        Section::new(id, cells.iter().map(|&(c, v)| Keyed::new(c, v)).collect())
    }

    fn ids<S: DiffableSection>(sections: &[S]) -> Vec<(String, Vec<String>)> {
        sections
            .iter()
            .map(|s| {
                (
                    s.diff_identifier().to_string(),
                    s.cells().iter().map(|c| c.diff_identifier().to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_identical_sections_have_no_changes() {
        let old = vec![section("s1", &[("a", 0), ("b", 0)]), section("s2", &[("c", 0)])];
        let update = diff_sections(&old, &old.clone());
        assert!(!update.has_changes());
        assert_eq!(update.rows.len(), 2);
    }

    #[test]
    fn test_row_paths_use_old_and_new_sections() {
        let old = vec![
            section("top", &[("x", 0)]),
            section("s", &[("a", 0), ("b", 0), ("c", 0)]),
        ];
        let new = vec![section("s", &[("c", 1), ("a", 0), ("d", 0)])];

        let update = diff_sections(&old, &new);
        assert_eq!(update.sections.ops, vec![Operation::Delete { old_idx: 0 }]);

        let rows: Vec<_> = update.row_operations().collect();
        assert_eq!(
            rows,
            vec![
                Operation::Delete { old_idx: IndexPath::new(1, 1) },
                Operation::Insert { new_idx: IndexPath::new(0, 2) },
                Operation::Move {
                    old_idx: IndexPath::new(1, 0),
                    new_idx: IndexPath::new(0, 1),
                },
                Operation::Update {
                    old_idx: IndexPath::new(1, 2),
                    new_idx: IndexPath::new(0, 0),
                },
            ]
        );
        assert!(update.rows_for(0).is_some());
        assert!(update.rows_for(1).is_none());
    }

    #[test]
    fn test_inserted_section_has_no_rows() {
        let old = vec![section("a", &[("1", 0)])];
        let new = vec![section("a", &[("1", 0)]), section("b", &[("2", 0), ("3", 0)])];
        let update = diff_sections(&old, &new);
        assert_eq!(update.sections.ops, vec![Operation::Insert { new_idx: 1 }]);
        assert_eq!(update.row_operations().count(), 0);
    }

    #[test]
    fn test_section_title_change_is_update() {
        let old = vec![section("a", &[]).with_title("Old")];
        let new = vec![section("a", &[]).with_title("New")];
        let update = diff_sections(&old, &new);
        assert_eq!(update.sections.ops, vec![Operation::Update { old_idx: 0, new_idx: 0 }]);
    }

    #[test]
    fn test_cell_moving_between_sections() {
        let old = vec![section("a", &[("x", 0), ("y", 0)]), section("b", &[])];
        let new = vec![section("a", &[("y", 0)]), section("b", &[("x", 0)])];
        let update = diff_sections(&old, &new);
        let rows: Vec<_> = update.row_operations().collect();
        assert!(rows.contains(&Operation::Delete { old_idx: IndexPath::new(0, 0) }));
        assert!(rows.contains(&Operation::Insert { new_idx: IndexPath::new(1, 0) }));
    }

    #[test]
    fn test_apply_batch_reproduces_new() {
        let old = vec![
            section("s1", &[("a", 0), ("b", 0), ("c", 0)]),
            section("s2", &[("d", 0)]),
            section("s3", &[("e", 0)]),
        ];
        let new = vec![
            section("s3", &[("e", 1), ("f", 0)]),
            section("s1", &[("c", 0), ("a", 2)]),
            section("s4", &[("g", 0)]),
        ];

        let update = diff_sections(&old, &new);
        let result = apply_batch(&old, &new, &update);
        assert_eq!(ids(&result), ids(&new));
        assert_eq!(result, new);
    }

    #[test]
    fn test_budget_applies_to_rows() {
        let old = vec![section("s", &[("a", 0), ("b", 0)])];
        let new = vec![section("s", &[("c", 0), ("d", 0)])];
        let update = diff_sections_with_config(&old, &new, DiffConfig::bounded(2));
        assert!(!update.sections.should_reload);
        assert!(update.should_reload());
        assert!(update.has_changes());
        assert_eq!(apply_batch(&old, &new, &update), new);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let old = vec![
            section("s1", &[("a", 0), ("b", 0)]),
            section("s2", &[("c", 0), ("d", 0)]),
        ];
        let new = vec![
            section("s2", &[("d", 0), ("c", 1)]),
            section("s1", &[("b", 0), ("z", 0)]),
        ];
        let seq = diff_sections(&old, &new);
        let par = diff_sections_par(&old, &new, DiffConfig::default());
        let seq_rows: Vec<_> = seq.row_operations().collect();
        let par_rows: Vec<_> = par.row_operations().collect();
        assert_eq!(seq_rows, par_rows);
        assert_eq!(seq.sections.ops, par.sections.ops);
    }
}
