//! Store identifiers and entity locations.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier for a dense component store.
///
/// Real stores get ids from 1 upward, issued by the registry they attach to.
/// Two values are reserved: [`StoreId::NONE`] marks an entity that is alive
/// but not resident in any store, and [`StoreId::INVALID`] marks a record
/// that is free or was erased.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoreId(u16);

impl StoreId {
    /// Sentinel for "alive, but not resident in any store".
    pub const NONE: Self = Self(0);

    /// Sentinel for "no such entity"; never identifies a real store.
    pub const INVALID: Self = Self(u16::MAX);

    /// Creates a store id from its raw value.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw store id value.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Returns true if this is the "no store" sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this is the invalid sentinel.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == u16::MAX
    }
}

impl fmt::Debug for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "StoreId(none)")
        } else if self.is_invalid() {
            write!(f, "StoreId(invalid)")
        } else {
            write!(f, "StoreId({})", self.0)
        }
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Store(none)")
        } else if self.is_invalid() {
            write!(f, "Store(invalid)")
        } else {
            write!(f, "Store({})", self.0)
        }
    }
}

/// Where an entity's component row currently lives.
///
/// A location is either unassigned (the entity is alive but loose), or a
/// (store, row) pair naming the dense index of the entity's row inside one
/// store. The invalid location exists so that erasure can be expressed as a
/// location write; it is never stored on a live record.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    store: StoreId,
    row: u32,
}

impl Location {
    /// Creates the location of an entity that is in no store.
    #[must_use]
    pub const fn unassigned() -> Self {
        Self {
            store: StoreId::NONE,
            row: 0,
        }
    }

    /// Creates the location of a row inside a store.
    ///
    /// `store` must be a real store id, not one of the sentinels.
    #[must_use]
    pub fn in_store(store: StoreId, row: u32) -> Self {
        debug_assert!(!store.is_none() && !store.is_invalid());
        Self { store, row }
    }

    /// Creates the location that marks an erased record.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            store: StoreId::INVALID,
            row: 0,
        }
    }

    /// Returns the store this location points into.
    #[must_use]
    pub const fn store(self) -> StoreId {
        self.store
    }

    /// Returns the dense row index within the store.
    #[must_use]
    pub const fn row(self) -> u32 {
        self.row
    }

    /// Returns the dense row index as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.row as usize
    }

    /// Returns true if the entity is alive but in no store.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.store.is_none()
    }

    /// Returns true if the entity is resident in a store.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        !self.store.is_none() && !self.store.is_invalid()
    }

    /// Returns true if this is the erased-record marker.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.store.is_invalid()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::unassigned()
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unassigned() {
            write!(f, "Location(unassigned)")
        } else if self.is_invalid() {
            write!(f, "Location(invalid)")
        } else {
            write!(f, "Location({} row {})", self.store, self.row)
        }
    }
}
