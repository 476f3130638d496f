//! Core identifier, location, and error types for Warren.
//!
//! This crate provides:
//! - [`EntityId`] - Densely-assigned entity identifiers
//! - [`Handle`] - Generational references with stale detection
//! - [`StoreId`] / [`Location`] - Where an entity's component row lives
//! - [`Error`] - Error types shared by all storage operations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod error;
pub mod location;

pub use entity::{EntityId, Handle};
pub use error::{Error, Result};
pub use location::{Location, StoreId};
