//! Error types for collection-diff.
//!
//! Only the checked mutations of [`SectionList`](crate::SectionList) can fail.
//! Diffing and applying never return errors.

use thiserror::Error;

use crate::index_path::IndexPath;

/// Errors returned by checked section store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Section index is past the end of the section list
    #[error("section index {index} out of bounds (len {len})")]
    SectionOutOfBounds {
        /// Requested section index
        index: usize,
        /// Number of sections
        len: usize,
    },

    /// Row is past the end of its section
    #[error("row {path} out of bounds (section has {len} cells)")]
    RowOutOfBounds {
        /// Requested index path
        path: IndexPath,
        /// Number of cells in the section
        len: usize,
    },
}

/// Result type alias for section store operations.
pub type CollectionResult<T> = Result<T, CollectionError>;

impl CollectionError {
    pub(crate) fn section(index: usize, len: usize) -> Self {
        Self::SectionOutOfBounds { index, len }
    }

    pub(crate) fn row(path: IndexPath, len: usize) -> Self {
        Self::RowOutOfBounds { path, len }
    }
}
