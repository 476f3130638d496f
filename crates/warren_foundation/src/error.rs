//! Error types for the Warren containers.
//!
//! Uses `thiserror` for ergonomic error definition. Capacity exhaustion and
//! checked-API misuse are ordinary `Err` values; the containers they come
//! from are left untouched by the failed operation.

use thiserror::Error;

use crate::entity::{EntityId, Handle};
use crate::location::StoreId;

/// Convenience alias for results carrying a Warren [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for Warren storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Entity creation refused: the live count reached the id limit.
    #[error("id space exhausted (limit {limit})")]
    IdExhausted {
        /// The configured id limit.
        limit: usize,
    },

    /// Insertion refused: the store reached its element limit.
    #[error("{store} full (limit {limit})")]
    StoreFull {
        /// The store that is full.
        store: StoreId,
        /// The configured element limit.
        limit: usize,
    },

    /// The entity does not exist or was erased.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// The handle's generation no longer matches its slot.
    #[error("stale handle: {0:?}")]
    StaleHandle(Handle),

    /// Add precondition violated: the entity is already resident in a store.
    #[error("{id} already assigned to {store}")]
    AlreadyAssigned {
        /// The entity that was being added.
        id: EntityId,
        /// The store it currently resides in.
        store: StoreId,
    },

    /// The entity is not resident in the store that was asked.
    #[error("{id} not in {store}")]
    NotInStore {
        /// The entity that was queried.
        id: EntityId,
        /// The store that does not hold it.
        store: StoreId,
    },

    /// Limit change refused: live entities would not fit under it.
    #[error("limit {limit} too small: {live} ids live above or at it")]
    LimitBelowLive {
        /// The proposed limit.
        limit: usize,
        /// How many live ids conflict with it.
        live: usize,
    },
}
