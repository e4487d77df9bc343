//! Prelude for common imports.
//!
//! ```
//! use collection_diff::prelude::*;
//! ```

// Items
pub use crate::item::{Diffable, Keyed};

// Algorithms
pub use crate::algo::{
    apply, compute_diff, compute_diff_with_config, Changeset, DiffConfig, DiffStats, MovePolicy, Operation,
};

// Sections
pub use crate::section::{apply_batch, diff_sections, diff_sections_with_config, BatchUpdate, DiffableSection, Section};

// Store
pub use crate::store::SectionList;

pub use crate::index_path::IndexPath;

// Error
pub use crate::error::{CollectionError, CollectionResult};
