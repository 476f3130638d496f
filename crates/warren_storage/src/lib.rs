//! Entity registry and dense component storage for Warren.
//!
//! This crate provides:
//! - [`SlotArena`] - Generational slot allocation over dense values
//! - [`EntityRegistry`] - The id authority that tracks where entities live
//! - [`ComponentStore`] - Packed single-component storage
//! - [`ArchetypeStore`] - Packed multi-column storage over a [`Row`] shape

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod archetype;
pub mod component;
pub mod registry;
pub mod row;

pub use arena::{ReusePolicy, SlotArena};
pub use archetype::ArchetypeStore;
pub use component::ComponentStore;
pub use registry::EntityRegistry;
pub use row::Row;
