//! Identity and equality for diffable items
//!
//! Every item taking part in a diff exposes two things:
//!
//! - a **diff identifier**: a string key that stays the same for "the same"
//!   item across two snapshots, used to match old and new items;
//! - a **content equality** test, used to decide whether a matched item
//!   needs its content refreshed.
//!
//! Identifiers must be unique within one snapshot. Duplicates do not panic,
//! but the resulting mapping is best-effort.
//!
//! Items are plain values: any per-item state (selection, cached size, ...)
//! lives in fields of the implementing type.

use std::rc::Rc;
use std::sync::Arc;

use compact_str::CompactString;

// =============================================================================
// Diffable
// =============================================================================

/// An item that can be matched across two snapshots and compared for changes.
///
/// ```
/// use collection_diff::Diffable;
///
/// struct Contact {
///     email: String,
///     name: String,
/// }
///
/// impl Diffable for Contact {
///     fn diff_identifier(&self) -> &str {
///         &self.email
///     }
///
///     fn is_content_equal(&self, other: &Self) -> bool {
///         self.name == other.name
///     }
/// }
/// ```
pub trait Diffable {
    /// Stable key correlating this item across snapshots.
    fn diff_identifier(&self) -> &str;

    /// Whether `other` (an item with the same identifier) has the same content.
    fn is_content_equal(&self, other: &Self) -> bool;
}

impl<T: Diffable + ?Sized> Diffable for &T {
    #[inline]
    fn diff_identifier(&self) -> &str {
        (**self).diff_identifier()
    }

    #[inline]
    fn is_content_equal(&self, other: &Self) -> bool {
        (**self).is_content_equal(*other)
    }
}

macro_rules! impl_diffable_for_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Diffable + ?Sized> Diffable for $ptr<T> {
                #[inline]
                fn diff_identifier(&self) -> &str {
                    (**self).diff_identifier()
                }

                #[inline]
                fn is_content_equal(&self, other: &Self) -> bool {
                    (**self).is_content_equal(&**other)
                }
            }
        )*
    };
}

impl_diffable_for_pointer!(Box, Rc, Arc);

// =============================================================================
// Keyed
// =============================================================================

/// A value paired with an explicit diff identifier.
///
/// Content equality is the payload's `PartialEq`.
///
/// ```
/// use collection_diff::{Diffable, Keyed};
///
/// let old = Keyed::new("row-1", 10);
/// let new = Keyed::new("row-1", 11);
/// assert_eq!(old.diff_identifier(), new.diff_identifier());
/// assert!(!old.is_content_equal(&new));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyed<T> {
    pub id: CompactString,
    pub value: T,
}

impl<T> Keyed<T> {
    pub fn new(id: impl Into<CompactString>, value: T) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    /// Replace the payload, keeping the identifier.
    pub fn with_value<U>(self, value: U) -> Keyed<U> {
        Keyed { id: self.id, value }
    }
}

impl<T: PartialEq> Diffable for Keyed<T> {
    #[inline]
    fn diff_identifier(&self) -> &str {
        &self.id
    }

    #[inline]
    fn is_content_equal(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Diffable for str {
    #[inline]
    fn diff_identifier(&self) -> &str {
        self
    }

    #[inline]
    fn is_content_equal(&self, _other: &Self) -> bool {
        true
    }
}

impl Diffable for String {
    #[inline]
    fn diff_identifier(&self) -> &str {
        self
    }

    #[inline]
    fn is_content_equal(&self, _other: &Self) -> bool {
        true
    }
}

impl Diffable for CompactString {
    #[inline]
    fn diff_identifier(&self) -> &str {
        self
    }

    #[inline]
    fn is_content_equal(&self, _other: &Self) -> bool {
        true
    }
}
