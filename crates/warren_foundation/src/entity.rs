//! Entity identifiers and generational handles.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier for an entity slot.
///
/// Ids are assigned densely from zero by the registry that owns them, so they
/// double as direct indices into id-keyed tables. An id says nothing about
/// liveness on its own: after the slot is freed the same id will eventually be
/// issued again. Code that holds ids across erasures should hold a [`Handle`]
/// instead.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId(u32);

impl EntityId {
    /// Sentinel id that is never issued for a live entity.
    pub const INVALID: Self = Self(u32::MAX);

    /// Creates an id from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the id as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true if this is the invalid sentinel.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "EntityId(invalid)")
        } else {
            write!(f, "EntityId({})", self.0)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "Entity(invalid)")
        } else {
            write!(f, "Entity({})", self.0)
        }
    }
}

/// Generational reference to an entity.
///
/// A handle pairs an [`EntityId`] with the generation the slot carried when
/// the handle was minted. The generation counter increments each time the slot
/// is freed, so a handle to an erased entity fails validation even after the
/// id has been reissued.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Handle {
    /// The entity id this handle refers to.
    pub id: EntityId,
    /// Generation of the slot at mint time.
    pub generation: u32,
}

impl Handle {
    /// Creates a handle from an id and a generation.
    #[must_use]
    pub const fn new(id: EntityId, generation: u32) -> Self {
        Self { id, generation }
    }

    /// Returns a sentinel value representing "no entity".
    #[must_use]
    pub const fn null() -> Self {
        Self {
            id: EntityId::INVALID,
            generation: 0,
        }
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.id.is_invalid()
    }

    /// Returns the entity id.
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }

    /// Returns the generation at mint time.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Handle(null)")
        } else {
            write!(f, "Handle({}v{})", self.id.get(), self.generation)
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({})", self.id.get())
        }
    }
}
