//! Dense multi-column storage.
//!
//! [`ArchetypeStore`] keeps a bundle of component types in structure-of-arrays
//! form: one dense column per component, all moving in lockstep through the
//! [`Row`] trait. Residency and row moves flow through the registry exactly as
//! they do for [`ComponentStore`](crate::ComponentStore); the two stores obey
//! the same contracts and differ only in what one row holds.
//!
//! There is no mutable row iterator. Bulk mutation goes through the typed
//! column slices from [`column_mut`](ArchetypeStore::column_mut) or one row at
//! a time through [`row_mut`](ArchetypeStore::row_mut).

// Rows are u32 by construction; store lengths never exceed them.
#![allow(clippy::cast_possible_truncation)]

use std::fmt;

use warren_foundation::{EntityId, Error, Handle, Location, Result, StoreId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arena::MAX_IDS;
use crate::registry::EntityRegistry;
use crate::row::Row;

/// Packed storage for one row shape.
///
/// Bound to the registry that issued its [`StoreId`] at construction. Row
/// order is unspecified and changes on removal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "R::Columns: Serialize",
        deserialize = "R::Columns: Deserialize<'de>"
    ))
)]
pub struct ArchetypeStore<R: Row> {
    store: StoreId,
    ids: Vec<EntityId>,
    columns: R::Columns,
    limit: usize,
}

impl<R: Row> ArchetypeStore<R> {
    /// Creates a store registered with `registry`.
    #[must_use]
    pub fn new<M: Copy>(registry: &mut EntityRegistry<M>) -> Self {
        Self {
            store: registry.register_store(),
            ids: Vec::new(),
            columns: R::Columns::default(),
            limit: MAX_IDS,
        }
    }

    /// Sets the element limit. Intended at construction time.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_IDS);
        self
    }

    /// Preallocates room for `capacity` rows.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.ids.reserve(capacity);
        R::reserve(&mut self.columns, capacity);
        self
    }

    /// Adds a row for an entity that is currently in no store.
    ///
    /// # Errors
    /// Returns [`Error::StoreFull`] at the element limit, or
    /// [`Error::AlreadyAssigned`] if the entity resides in any store.
    /// Nothing changes on error.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn add<M: Copy>(
        &mut self,
        registry: &mut EntityRegistry<M>,
        id: EntityId,
        row: R,
    ) -> Result<()> {
        if self.ids.len() >= self.limit {
            return Err(Error::StoreFull {
                store: self.store,
                limit: self.limit,
            });
        }
        let location = registry.location(id);
        if !location.is_unassigned() {
            return Err(Error::AlreadyAssigned {
                id,
                store: location.store(),
            });
        }
        let new_row = self.ids.len() as u32;
        registry.set_location(id, Location::in_store(self.store, new_row));
        self.ids.push(id);
        R::push(&mut self.columns, row);
        Ok(())
    }

    /// Creates a fresh entity and adds its row in one step.
    ///
    /// # Errors
    /// Returns [`Error::StoreFull`] at the element limit, or
    /// [`Error::IdExhausted`] if the registry cannot create the entity.
    /// Nothing is created anywhere on error.
    pub fn add_new<M: Copy>(
        &mut self,
        registry: &mut EntityRegistry<M>,
        row: R,
        metadata: M,
    ) -> Result<Handle> {
        if self.ids.len() >= self.limit {
            return Err(Error::StoreFull {
                store: self.store,
                limit: self.limit,
            });
        }
        let new_row = self.ids.len() as u32;
        let handle = registry.create(Location::in_store(self.store, new_row), metadata)?;
        self.ids.push(handle.id());
        R::push(&mut self.columns, row);
        Ok(handle)
    }

    /// Detaches an entity's row without destroying the entity.
    ///
    /// Returns false if the entity is not resident here.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn remove<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, id: EntityId) -> bool {
        self.take(registry, id).is_some()
    }

    /// Like [`remove`](Self::remove), but hands the row back.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn take<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, id: EntityId) -> Option<R> {
        let location = registry.location(id);
        if location.store() != self.store {
            return None;
        }
        let row = self.take_row(registry, location.index());
        registry.set_location(id, Location::unassigned());
        Some(row)
    }

    /// Removes the row and destroys the entity's registry record.
    ///
    /// Returns false if the entity is not resident here.
    ///
    /// # Panics
    /// Panics if `id` does not name a live entity.
    pub fn erase<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, id: EntityId) -> bool {
        let location = registry.location(id);
        if location.store() != self.store {
            return false;
        }
        self.take_row(registry, location.index());
        registry.erase_id(id);
        true
    }

    /// Erases every resident whose row matches the predicate.
    ///
    /// Sweeps the dense rows with swap-and-pop per match; the row swapped
    /// into the hole is tested before the cursor advances. Returns the
    /// number erased.
    pub fn erase_if<M: Copy, F>(&mut self, registry: &mut EntityRegistry<M>, mut pred: F) -> usize
    where
        F: for<'a> FnMut(EntityId, R::Ref<'a>) -> bool,
    {
        let mut erased = 0;
        let mut row = 0;
        while row < self.ids.len() {
            if pred(self.ids[row], R::get(&self.columns, row)) {
                let id = self.ids[row];
                self.take_row(registry, row);
                registry.erase_id(id);
                erased += 1;
            } else {
                row += 1;
            }
        }
        erased
    }

    /// Erases every resident whose `T` component matches the predicate.
    ///
    /// Same sweep as [`erase_if`](Self::erase_if), but the predicate sees
    /// only the first `T` column.
    ///
    /// # Panics
    /// Panics if the row shape has no `T` column.
    pub fn erase_if_component<T: 'static, M: Copy, F>(
        &mut self,
        registry: &mut EntityRegistry<M>,
        mut pred: F,
    ) -> usize
    where
        F: FnMut(EntityId, &T) -> bool,
    {
        let mut erased = 0;
        let mut row = 0;
        while row < self.ids.len() {
            let matched = {
                let column = Self::typed_column::<T>(&self.columns);
                pred(self.ids[row], &column[row])
            };
            if matched {
                let id = self.ids[row];
                self.take_row(registry, row);
                registry.erase_id(id);
                erased += 1;
            } else {
                row += 1;
            }
        }
        erased
    }

    /// Returns true if the entity is alive and its row lives here.
    #[must_use]
    pub fn contains<M: Copy>(&self, registry: &EntityRegistry<M>, id: EntityId) -> bool {
        registry.contains(id) && registry.location(id).store() == self.store
    }

    /// Returns the row for a validated handle.
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] or [`Error::StaleHandle`] for a
    /// dead handle, or [`Error::NotInStore`] if the entity lives elsewhere.
    pub fn get<'a, M: Copy>(
        &'a self,
        registry: &EntityRegistry<M>,
        handle: Handle,
    ) -> Result<R::Ref<'a>> {
        registry.validate(handle)?;
        let location = registry.location(handle.id());
        if location.store() != self.store {
            return Err(Error::NotInStore {
                id: handle.id(),
                store: self.store,
            });
        }
        Ok(R::get(&self.columns, location.index()))
    }

    /// Mutable variant of [`get`](Self::get).
    ///
    /// # Errors
    /// Returns [`Error::EntityNotFound`] or [`Error::StaleHandle`] for a
    /// dead handle, or [`Error::NotInStore`] if the entity lives elsewhere.
    pub fn get_mut<'a, M: Copy>(
        &'a mut self,
        registry: &EntityRegistry<M>,
        handle: Handle,
    ) -> Result<R::Mut<'a>> {
        registry.validate(handle)?;
        let location = registry.location(handle.id());
        if location.store() != self.store {
            return Err(Error::NotInStore {
                id: handle.id(),
                store: self.store,
            });
        }
        Ok(R::get_mut(&mut self.columns, location.index()))
    }

    /// Returns the row of a live resident entity.
    ///
    /// Raw-tier accessor: one indexed load off the registry location.
    ///
    /// # Panics
    /// Panics if the entity is dead; debug builds also assert residency.
    #[must_use]
    pub fn row<'a, M: Copy>(&'a self, registry: &EntityRegistry<M>, id: EntityId) -> R::Ref<'a> {
        let location = registry.location(id);
        debug_assert!(
            location.store() == self.store,
            "row() for {id:?} outside {}",
            self.store
        );
        R::get(&self.columns, location.index())
    }

    /// Mutable variant of [`row`](Self::row).
    ///
    /// # Panics
    /// Panics if the entity is dead; debug builds also assert residency.
    #[must_use]
    pub fn row_mut<'a, M: Copy>(
        &'a mut self,
        registry: &EntityRegistry<M>,
        id: EntityId,
    ) -> R::Mut<'a> {
        let location = registry.location(id);
        debug_assert!(
            location.store() == self.store,
            "row_mut() for {id:?} outside {}",
            self.store
        );
        R::get_mut(&mut self.columns, location.index())
    }

    /// Borrows the row at a dense index.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row_at(&self, row: usize) -> R::Ref<'_> {
        R::get(&self.columns, row)
    }

    /// Mutable variant of [`row_at`](Self::row_at).
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row_at_mut(&mut self, row: usize) -> R::Mut<'_> {
        R::get_mut(&mut self.columns, row)
    }

    /// Returns the first column of element type `T` as a slice.
    #[must_use]
    pub fn column<T: 'static>(&self) -> Option<&[T]> {
        R::column::<T>(&self.columns).map(Vec::as_slice)
    }

    /// Mutable variant of [`column`](Self::column).
    ///
    /// The slice allows editing elements in place; rows cannot be added or
    /// removed through it.
    #[must_use]
    pub fn column_mut<T: 'static>(&mut self) -> Option<&mut [T]> {
        R::column_mut::<T>(&mut self.columns).map(Vec::as_mut_slice)
    }

    /// Returns the resident ids in dense order.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Iterates `(id, row)` pairs in dense order.
    pub fn rows(&self) -> impl Iterator<Item = (EntityId, R::Ref<'_>)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .map(|(row, &id)| (id, R::get(&self.columns, row)))
    }

    /// Returns the number of resident rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns this store's id.
    #[must_use]
    pub fn store_id(&self) -> StoreId {
        self.store
    }

    /// Returns the element limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Reserves room for at least `additional` more rows.
    pub fn reserve(&mut self, additional: usize) {
        self.ids.reserve(additional);
        R::reserve(&mut self.columns, additional);
    }

    /// Sheds unused memory.
    pub fn shrink_to_fit(&mut self) {
        self.ids.shrink_to_fit();
        R::shrink_to_fit(&mut self.columns);
    }

    /// Detaches every resident entity and empties the store.
    ///
    /// All former residents stay alive with unassigned locations.
    pub fn clear<M: Copy>(&mut self, registry: &mut EntityRegistry<M>) {
        for &id in &self.ids {
            registry.set_location(id, Location::unassigned());
        }
        self.ids.clear();
        R::clear(&mut self.columns);
    }

    /// Checks store/registry agreement row by row.
    ///
    /// Intended for tests and debug assertions.
    ///
    /// # Errors
    /// Returns the first inconsistency found: a resident id that is not
    /// live, or a resident whose registry location does not point back at
    /// its row.
    pub fn validate<M: Copy>(&self, registry: &EntityRegistry<M>) -> Result<()> {
        debug_assert_eq!(self.ids.len(), R::len(&self.columns));
        for (row, &id) in self.ids.iter().enumerate() {
            if !registry.contains(id) {
                return Err(Error::EntityNotFound(id));
            }
            let location = registry.location(id);
            if location.store() != self.store || location.index() != row {
                return Err(Error::NotInStore {
                    id,
                    store: self.store,
                });
            }
        }
        Ok(())
    }

    /// Swap-and-pops the row at `row` from every column, rewriting the
    /// location of the entity moved into the hole.
    fn take_row<M: Copy>(&mut self, registry: &mut EntityRegistry<M>, row: usize) -> R {
        let taken = R::swap_remove(&mut self.columns, row);
        self.ids.swap_remove(row);
        if row < self.ids.len() {
            let moved = self.ids[row];
            registry.set_location(moved, Location::in_store(self.store, row as u32));
        }
        taken
    }

    fn typed_column<T: 'static>(columns: &R::Columns) -> &Vec<T> {
        match R::column::<T>(columns) {
            Some(column) => column,
            None => panic!("row shape has no {} column", std::any::type_name::<T>()),
        }
    }
}

impl<R: Row> Clone for ArchetypeStore<R>
where
    R::Columns: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            ids: self.ids.clone(),
            columns: self.columns.clone(),
            limit: self.limit,
        }
    }
}

impl<R: Row> fmt::Debug for ArchetypeStore<R>
where
    R::Columns: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchetypeStore")
            .field("store", &self.store)
            .field("ids", &self.ids)
            .field("columns", &self.columns)
            .field("limit", &self.limit)
            .finish()
    }
}
