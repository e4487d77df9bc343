//! Algorithm implementations for collection diffing.
//!
//! - `diff`: keyed list diff producing insert/delete/move/update scripts
//! - `lis`: O(n log n) common subsequence for unique identifiers
//! - `myers`: Myers LCS over identifier sequences with duplicates
//! - `apply`: replaying a script over a snapshot

mod apply;
mod diff;
mod lis;
mod myers;

pub use apply::apply;
pub use diff::{
    compute_diff, compute_diff_with_config, Changeset, DiffConfig, DiffStats, MovePolicy, Operation,
};
