//! Section store for collection content.
//!
//! Owns the current sections, answers lookups by index, index path and
//! identifier, and swaps in new content while reporting the batch update
//! a view needs to animate the change.

use crate::algo::{compute_diff_with_config, Changeset, DiffConfig};
use crate::error::{CollectionError, CollectionResult};
use crate::index_path::IndexPath;
use crate::item::Diffable;
use crate::section::{diff_sections_with_config, BatchUpdate, DiffableSection};

// =============================================================================
// SectionList
// =============================================================================

/// Ordered sections of a collection.
///
/// Lookups return `Option` and never panic. Structural mutations are
/// checked and return [`CollectionError`] for out-of-range positions.
///
/// ```
/// use collection_diff::{IndexPath, Keyed, Section, SectionList};
///
/// let mut list = SectionList::new(vec![Section::new("s", vec![Keyed::new("a", 1)])]);
/// let update = list.update(vec![Section::new("s", vec![Keyed::new("b", 1), Keyed::new("a", 1)])]);
///
/// assert!(update.has_changes());
/// assert_eq!(list.index_path_of("a"), Some(IndexPath::new(0, 1)));
/// ```
#[derive(Debug, Clone)]
pub struct SectionList<S> {
    sections: Vec<S>,
    config: DiffConfig,
}

impl<S> Default for SectionList<S> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            config: DiffConfig::default(),
        }
    }
}

impl<S: DiffableSection> SectionList<S> {
    pub fn new(sections: Vec<S>) -> Self {
        Self {
            sections,
            config: DiffConfig::default(),
        }
    }

    /// Use `config` for subsequent [`update`](Self::update) calls.
    pub fn with_config(mut self, config: DiffConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> DiffConfig {
        self.config
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn sections(&self) -> &[S] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<S> {
        self.sections
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, index: usize) -> Option<&S> {
        self.sections.get(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut S> {
        self.sections.get_mut(index)
    }

    pub fn cell(&self, path: IndexPath) -> Option<&S::Cell> {
        self.section(path.section)?.cells().get(path.row)
    }

    /// Number of cells in `section`, 0 when the section does not exist.
    pub fn number_of_items(&self, section: usize) -> usize {
        self.section(section).map_or(0, |s| s.cells().len())
    }

    /// Total number of cells across all sections.
    pub fn total_items(&self) -> usize {
        self.sections.iter().map(|s| s.cells().len()).sum()
    }

    /// Position of the section with identifier `id`.
    pub fn first_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.diff_identifier() == id)
    }

    /// Index path of the first cell with identifier `id`.
    pub fn index_path_of(&self, id: &str) -> Option<IndexPath> {
        self.index_paths()
            .find(|&path| self.cell(path).is_some_and(|c| c.diff_identifier() == id))
    }

    /// Every cell's index path, section-major.
    pub fn index_paths(&self) -> impl Iterator<Item = IndexPath> + '_ {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(section, s)| (0..s.cells().len()).map(move |row| IndexPath::new(section, row)))
    }

    /// Visit every cell with its index path.
    pub fn for_each_cell(&self, mut f: impl FnMut(IndexPath, &S::Cell)) {
        for (section, s) in self.sections.iter().enumerate() {
            for (row, cell) in s.cells().iter().enumerate() {
                f(IndexPath::new(section, row), cell);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Checked mutations
    // -------------------------------------------------------------------------

    /// Insert a section at `index` (`index == len` appends).
    pub fn insert_section(&mut self, index: usize, section: S) -> CollectionResult<()> {
        if index > self.sections.len() {
            return Err(CollectionError::section(index, self.sections.len()));
        }
        self.sections.insert(index, section);
        Ok(())
    }

    pub fn remove_section(&mut self, index: usize) -> CollectionResult<S> {
        self.check_section(index)?;
        Ok(self.sections.remove(index))
    }

    /// Move the section at `from` so it ends up at `to`.
    pub fn move_section(&mut self, from: usize, to: usize) -> CollectionResult<()> {
        self.check_section(from)?;
        self.check_section(to)?;
        let section = self.sections.remove(from);
        self.sections.insert(to, section);
        Ok(())
    }

    /// Insert `cells` into `section` starting at `row` (`row == len` appends).
    pub fn insert_cells(
        &mut self,
        cells: impl IntoIterator<Item = S::Cell>,
        section: usize,
        row: usize,
    ) -> CollectionResult<()> {
        let len = self.sections.len();
        let target = self
            .sections
            .get_mut(section)
            .ok_or(CollectionError::section(section, len))?
            .cells_mut();
        if row > target.len() {
            return Err(CollectionError::row(IndexPath::new(section, row), target.len()));
        }
        let tail = target.split_off(row);
        target.extend(cells);
        target.extend(tail);
        Ok(())
    }

    pub fn remove_cell(&mut self, path: IndexPath) -> CollectionResult<S::Cell> {
        let cells = self.cells_mut_checked(path)?;
        Ok(cells.remove(path.row))
    }

    /// Move a cell; `to` may be in another section and is the final position.
    pub fn move_cell(&mut self, from: IndexPath, to: IndexPath) -> CollectionResult<()> {
        self.cells_mut_checked(from)?;

        let dest_len = self.number_of_items(to.section);
        self.check_section(to.section)?;
        // Removing from the same section shortens it by one
        let dest_max = if from.section == to.section { dest_len - 1 } else { dest_len };
        if to.row > dest_max {
            return Err(CollectionError::row(to, dest_len));
        }

        let cell = self.sections[from.section].cells_mut().remove(from.row);
        self.sections[to.section].cells_mut().insert(to.row, cell);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Diffing updates
    // -------------------------------------------------------------------------

    /// Replace the content, returning what changed.
    pub fn update(&mut self, sections: Vec<S>) -> BatchUpdate {
        self.update_with_config(sections, self.config)
    }

    pub fn update_with_config(&mut self, sections: Vec<S>, config: DiffConfig) -> BatchUpdate {
        let update = diff_sections_with_config(&self.sections, &sections, config);
        tracing::debug!(
            old_sections = self.sections.len(),
            new_sections = sections.len(),
            reload = update.should_reload(),
            "section list updated"
        );
        self.sections = sections;
        update
    }

    /// Replace every cell of `section`, returning the row changes.
    pub fn replace_all_cells(&mut self, section: usize, cells: Vec<S::Cell>) -> CollectionResult<Changeset> {
        let config = self.config;
        let len = self.sections.len();
        let target = self
            .sections
            .get_mut(section)
            .ok_or(CollectionError::section(section, len))?
            .cells_mut();
        let changes = compute_diff_with_config(target.as_slice(), &cells, config);
        *target = cells;
        Ok(changes)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn check_section(&self, index: usize) -> CollectionResult<()> {
        if index < self.sections.len() {
            Ok(())
        } else {
            Err(CollectionError::section(index, self.sections.len()))
        }
    }

    fn cells_mut_checked(&mut self, path: IndexPath) -> CollectionResult<&mut Vec<S::Cell>> {
        let len = self.sections.len();
        let cells = self
            .sections
            .get_mut(path.section)
            .ok_or(CollectionError::section(path.section, len))?
            .cells_mut();
        if path.row >= cells.len() {
            return Err(CollectionError::row(path, cells.len()));
        }
        Ok(cells)
    }
}

impl<S: DiffableSection> FromIterator<S> for SectionList<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
