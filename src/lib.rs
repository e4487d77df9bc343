//! collection-diff - Keyed section/cell diffing for collection views
//!
//! ## Core Concepts
//!
//! **Diffable items**: every item carries a stable diff identifier and a
//! content equality test. Identifiers match items across two snapshots,
//! equality decides whether a matched item needs refreshing.
//!
//! **Edit scripts**: a diff is a list of [`Operation`]s (insert, delete,
//! move, update) in batch-update order: deletes (descending), inserts
//! (ascending), moves, updates. Reorders are found with an LCS of
//! identifiers so a rotation costs one move, not one per item.
//!
//! ## Modules
//! - `item`: the `Diffable` trait and the `Keyed` helper
//! - `algo`: flat list diff, LCS kernels (LIS and Myers), script replay
//! - `section`: two-level section/row diffing
//! - `store`: section store with index-path lookups and diffing updates
//! - `index_path`: section/row addressing
//! - `error`: checked store mutation errors
//!
//! ## Usage
//!
//! ```
//! use collection_diff::{compute_diff, Keyed, Operation};
//!
//! let old = vec![Keyed::new("a", "v1"), Keyed::new("b", "v1")];
//! let new = vec![Keyed::new("a", "v1"), Keyed::new("c", "v1")];
//!
//! let changes = compute_diff(&old, &new);
//! assert_eq!(
//!     changes.ops,
//!     vec![Operation::Delete { old_idx: 1 }, Operation::Insert { new_idx: 1 }]
//! );
//! ```

// =============================================================================
// Modules
// =============================================================================

/// Diffable item identity and equality
pub mod item;

/// Algorithms: diff, lis, myers, apply
pub mod algo;

/// Section/row diffing
pub mod section;

/// Section store
pub mod store;

/// Section/row addressing
pub mod index_path;

/// Error types
pub mod error;

/// Prelude for common imports
pub mod prelude;

#[cfg(test)]
pub(crate) mod test_capture;

// =============================================================================
// Re-exports
// =============================================================================

// Items
pub use item::{Diffable, Keyed};

// Algorithms
pub use algo::{
    apply, compute_diff, compute_diff_with_config, Changeset, DiffConfig, DiffStats, MovePolicy, Operation,
};

// Sections
pub use section::{
    apply_batch, diff_sections, diff_sections_with_config, BatchUpdate, DiffableSection, RowChangeset, Section,
};

#[cfg(feature = "parallel")]
pub use section::diff_sections_par;

// Store
pub use store::SectionList;

pub use index_path::IndexPath;

// Error types
pub use error::{CollectionError, CollectionResult};

// =============================================================================
// Tests
// =============================================================================
