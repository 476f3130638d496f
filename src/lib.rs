//! Warren - Generational entity registry and dense component storage
//!
//! This crate re-exports both layers of the Warren system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: warren_storage    — SlotArena, EntityRegistry, ComponentStore, ArchetypeStore
//! Layer 0: warren_foundation — Core types (EntityId, Handle, StoreId, Location, Error)
//! ```

pub use warren_foundation as foundation;
pub use warren_storage as storage;
